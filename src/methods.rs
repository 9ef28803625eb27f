//! Typed helpers for documented API methods.
//!
//! Each helper only assembles parameters and goes through [`Client::call`].
//! `subscribe` is the one method validated locally.

use crate::client::{ApiResult, Client};
use crate::error::ApiError;
use crate::params::{Param, Params};

/// The `fields` argument of `subscribe`: a bare email address or a field map.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscribeFields {
    Email(String),
    Map(Params),
}

impl From<&str> for SubscribeFields {
    fn from(value: &str) -> Self {
        SubscribeFields::Email(value.to_string())
    }
}

impl From<String> for SubscribeFields {
    fn from(value: String) -> Self {
        SubscribeFields::Email(value)
    }
}

impl From<Params> for SubscribeFields {
    fn from(value: Params) -> Self {
        SubscribeFields::Map(value)
    }
}

impl SubscribeFields {
    /// Resolves to a field map carrying at least an `email` or a `phone`.
    pub fn into_params(self) -> Result<Params, ApiError> {
        match self {
            SubscribeFields::Email(email) if email.is_empty() => Err(ApiError::Validation(
                "an email address is required when fields is a string".to_string(),
            )),
            SubscribeFields::Email(email) => Ok(Params::new().with("email", email)),
            SubscribeFields::Map(fields) => {
                if fields.contains_key("email") || fields.contains_key("phone") {
                    Ok(fields)
                } else {
                    Err(ApiError::Validation(
                        "fields must contain an email or phone key".to_string(),
                    ))
                }
            }
        }
    }
}

/// Builds the parameters of a `subscribe` call.
pub fn subscribe_params(
    list_ids: &str,
    fields: impl Into<SubscribeFields>,
    mut extra: Params,
) -> Result<Params, ApiError> {
    let fields = fields.into().into_params()?;
    extra.insert("list_ids", list_ids);
    extra.insert("fields", fields);
    Ok(extra)
}

/// Contact kind for `exclude` and `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactType {
    Email,
    Phone,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Email => "email",
            ContactType::Phone => "phone",
        }
    }
}

/// Required arguments of `sendEmail`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub email: String,
    pub sender_name: String,
    pub sender_email: String,
    pub subject: String,
    pub body: String,
    pub list_id: i64,
}

impl EmailMessage {
    fn into_params(self) -> Params {
        Params::new()
            .with("email", self.email)
            .with("sender_name", self.sender_name)
            .with("sender_email", self.sender_email)
            .with("subject", self.subject)
            .with("body", self.body)
            .with("list_id", self.list_id)
    }
}

fn merge(mut base: Params, extra: Params) -> Params {
    for (key, value) in extra {
        base.insert(key, value);
    }
    base
}

impl Client {
    /// Subscribes an email and/or phone to the comma-separated `list_ids`.
    ///
    /// Fails with [`ApiError::Validation`] before any request when `fields`
    /// names neither an email nor a phone.
    pub async fn subscribe(
        &self,
        list_ids: &str,
        fields: impl Into<SubscribeFields>,
        extra: Params,
    ) -> ApiResult {
        let params = subscribe_params(list_ids, fields, extra)?;
        self.call("subscribe", params).await
    }

    pub async fn get_lists(&self) -> ApiResult {
        self.call("getLists", Params::new()).await
    }

    pub async fn create_list(&self, title: &str, extra: Params) -> ApiResult {
        self.call("createList", merge(Params::new().with("title", title), extra))
            .await
    }

    pub async fn delete_list(&self, list_id: i64) -> ApiResult {
        self.call("deleteList", Params::new().with("list_id", list_id))
            .await
    }

    /// Removes a contact from `list_ids`, or from every list when empty.
    pub async fn exclude(
        &self,
        contact_type: ContactType,
        contact: &str,
        list_ids: &str,
    ) -> ApiResult {
        self.call("exclude", contact_params(contact_type, contact, list_ids))
            .await
    }

    pub async fn unsubscribe(
        &self,
        contact_type: ContactType,
        contact: &str,
        list_ids: &str,
    ) -> ApiResult {
        self.call("unsubscribe", contact_params(contact_type, contact, list_ids))
            .await
    }

    pub async fn send_sms(&self, phone: &str, sender: &str, text: &str) -> ApiResult {
        let params = Params::new()
            .with("phone", phone)
            .with("sender", sender)
            .with("text", text);
        self.call("sendSms", params).await
    }

    pub async fn check_sms(&self, sms_id: &str) -> ApiResult {
        self.call("checkSms", Params::new().with("sms_id", sms_id))
            .await
    }

    pub async fn send_email(&self, message: EmailMessage, extra: Params) -> ApiResult {
        self.call("sendEmail", merge(message.into_params(), extra))
            .await
    }

    pub async fn check_email(&self, email_id: &str) -> ApiResult {
        self.call("checkEmail", Params::new().with("email_id", email_id))
            .await
    }

    pub async fn get_campaign_status(&self, campaign_id: i64) -> ApiResult {
        self.call(
            "getCampaignStatus",
            Params::new().with("campaign_id", campaign_id),
        )
        .await
    }
}

fn contact_params(contact_type: ContactType, contact: &str, list_ids: &str) -> Params {
    let mut params = Params::new()
        .with("contact_type", contact_type.as_str())
        .with("contact", contact);
    if !list_ids.is_empty() {
        params.insert("list_ids", Param::from(list_ids));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::{MockTransport, PostRequest, TransportResponse};
    use std::sync::{Arc, Mutex};

    fn form_pairs(body: &[u8]) -> Vec<(String, String)> {
        url::form_urlencoded::parse(body).into_owned().collect()
    }

    fn client_with(transport: MockTransport) -> Client {
        let config = ClientConfig::new("key").hosts("http://a/", "http://b/");
        Client::with_transport(config, Arc::new(transport)).unwrap()
    }

    fn recording_client() -> (Client, Arc<Mutex<Vec<PostRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let mut transport = MockTransport::new();
        transport.expect_post().returning(move |request| {
            seen_clone.lock().unwrap().push(request);
            Ok(TransportResponse {
                status: 200,
                body: br#"{"result":{}}"#.to_vec(),
            })
        });
        (client_with(transport), seen)
    }

    #[test]
    fn test_subscribe_params_with_map() {
        let fields = Params::new().with("email", "a@b.com");
        let params = subscribe_params("1,2", fields.clone(), Params::new()).unwrap();

        assert_eq!(params.get("list_ids"), Some(&Param::from("1,2")));
        assert_eq!(params.get("fields"), Some(&Param::Map(fields)));
    }

    #[test]
    fn test_subscribe_params_phone_only() {
        let fields = Params::new().with("phone", "+79000000000");
        assert!(subscribe_params("1", fields, Params::new()).is_ok());
    }

    #[test]
    fn test_subscribe_params_string_is_email_shorthand() {
        let from_string = subscribe_params("1", "a@b.com", Params::new()).unwrap();
        let from_map =
            subscribe_params("1", Params::new().with("email", "a@b.com"), Params::new()).unwrap();
        assert_eq!(from_string, from_map);
    }

    #[test]
    fn test_subscribe_params_keeps_extra() {
        let extra = Params::new().with("double_optin", 3i64).with("tags", "vip");
        let params = subscribe_params("1", "a@b.com", extra).unwrap();

        assert_eq!(params.get("double_optin"), Some(&Param::Int(3)));
        assert_eq!(params.get("tags"), Some(&Param::from("vip")));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_subscribe_params_rejects_missing_contact() {
        let fields = Params::new().with("Name", "Ann");
        let result = subscribe_params("1", fields, Params::new());
        assert!(matches!(result, Err(ApiError::Validation(_))));

        let result = subscribe_params("1", Params::new(), Params::new());
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_subscribe_params_rejects_empty_email() {
        let result = subscribe_params("1", "", Params::new());
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_subscribe_validation_makes_no_request() {
        let mut transport = MockTransport::new();
        transport.expect_post().times(0);
        let client = client_with(transport);

        let result = client.subscribe("1", Params::new(), Params::new()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));

        let result = client.subscribe("1", "", Params::new()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_subscribe_sends_list_ids_and_fields() {
        let (client, seen) = recording_client();

        client
            .subscribe("1,2", "a@b.com", Params::new())
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].url, "http://a/subscribe");
        let pairs = form_pairs(&seen[0].body);
        assert!(pairs.contains(&("list_ids".to_string(), "1,2".to_string())));
        assert!(pairs.contains(&("fields[email]".to_string(), "a@b.com".to_string())));
    }

    #[tokio::test]
    async fn test_typed_wrappers_method_names() {
        let (client, seen) = recording_client();

        client.get_lists().await.unwrap();
        client.create_list("News", Params::new()).await.unwrap();
        client.delete_list(5).await.unwrap();
        client
            .exclude(ContactType::Email, "a@b.com", "")
            .await
            .unwrap();
        client
            .unsubscribe(ContactType::Phone, "+79000000000", "1,2")
            .await
            .unwrap();
        client.send_sms("+79000000000", "Shop", "Hi").await.unwrap();
        client.check_sms("123").await.unwrap();
        client
            .send_email(
                EmailMessage {
                    email: "a@b.com".to_string(),
                    sender_name: "Shop".to_string(),
                    sender_email: "shop@b.com".to_string(),
                    subject: "Hello".to_string(),
                    body: "<p>Hi</p>".to_string(),
                    list_id: 9,
                },
                Params::new(),
            )
            .await
            .unwrap();
        client.check_email("456").await.unwrap();
        client.get_campaign_status(77).await.unwrap();

        let seen = seen.lock().unwrap();
        let urls: Vec<&str> = seen.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://a/getLists",
                "http://a/createList",
                "http://a/deleteList",
                "http://a/exclude",
                "http://a/unsubscribe",
                "http://a/sendSms",
                "http://a/checkSms",
                "http://a/sendEmail",
                "http://a/checkEmail",
                "http://a/getCampaignStatus",
            ]
        );

        let exclude = form_pairs(&seen[3].body);
        assert!(exclude.contains(&("contact_type".to_string(), "email".to_string())));
        assert!(exclude.iter().all(|(k, _)| k != "list_ids"));

        let unsubscribe = form_pairs(&seen[4].body);
        assert!(unsubscribe.contains(&("contact_type".to_string(), "phone".to_string())));
        assert!(unsubscribe.contains(&("list_ids".to_string(), "1,2".to_string())));

        let send_email = form_pairs(&seen[7].body);
        assert!(send_email.contains(&("list_id".to_string(), "9".to_string())));
        assert!(send_email.contains(&("subject".to_string(), "Hello".to_string())));
    }

    #[tokio::test]
    async fn test_create_list_extra_params_override() {
        let (client, seen) = recording_client();

        client
            .create_list("News", Params::new().with("before_subscribe_url", "https://x/"))
            .await
            .unwrap();

        let pairs = form_pairs(&seen.lock().unwrap()[0].body);
        assert!(pairs.contains(&("title".to_string(), "News".to_string())));
        assert!(pairs.contains(&(
            "before_subscribe_url".to_string(),
            "https://x/".to_string()
        )));
    }
}

//! Mock cluster shared by the entity tests

use std::sync::{Arc, Mutex};

use crate::auth::Credentials;
use crate::client::ClusterClient;
use crate::message::Response;
use crate::transport::{HttpRequest, MockTransport};

pub(crate) const STORAGE_URL: &str = "https://os.example.com/v1/AUTH_acct";

pub(crate) type Sent = Arc<Mutex<Vec<HttpRequest>>>;

/// Client whose cluster answers every storage request with `response`
///
/// Authentication requests are answered but not recorded.
pub(crate) fn recording_client(response: Response) -> (ClusterClient, Sent) {
    let sent = Sent::default();
    let recorded = Arc::clone(&sent);

    let mut mock = MockTransport::new();
    mock.expect_send().returning(move |request| {
        if request.url.ends_with("/auth/v1.0") {
            return Ok(Response::new(200)
                .with_header("X-Storage-Url", STORAGE_URL)
                .with_header("X-Auth-Token", "AUTH_tk123"));
        }
        recorded.lock().unwrap().push(request);
        Ok(response.clone())
    });

    let credentials = Credentials::new("https://os.example.com", "acct:user", "secret").unwrap();
    (ClusterClient::builder(credentials, mock).build(), sent)
}

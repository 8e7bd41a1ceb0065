use std::time::Duration;

use sseg_gateway::{EndpointSettings, SecurityMode};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SVC_PATH: &str = "/SVC_Seguranca/Seguranca.svc";
pub const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";

// Plain HTTP stub of the security service; tests run with SecurityMode::None.
pub async fn start_sseg() -> MockServer {
    MockServer::start().await
}

pub fn settings_for(server: &MockServer) -> EndpointSettings {
    let url = format!("{}{SVC_PATH}", server.uri());
    let mut settings = EndpointSettings::new(url.parse().expect("mock server url"));
    settings.security_mode = SecurityMode::None;
    settings.send_timeout = Duration::from_secs(5);
    settings
}

#[allow(dead_code)]
pub async fn reply_with(server: &MockServer, status: u16, body: String) {
    reply_with_delay(server, status, body, Duration::ZERO).await;
}

#[allow(dead_code)]
pub async fn reply_with_delay(server: &MockServer, status: u16, body: String, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(SVC_PATH))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_raw(body, SOAP_CONTENT_TYPE)
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn ticket_envelope(id: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://www.w3.org/2005/08/addressing">
  <s:Header><a:Action s:mustUnderstand="1">http://tempuri.org/ISeguranca/LoginResponse</a:Action></s:Header>
  <s:Body>
    <LoginResponse xmlns="http://tempuri.org/">
      <LoginResult xmlns:b="http://schemas.datacontract.org/2004/07/Sseg" xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
        <b:id>{id}</b:id>
        <b:Usuario>alice</b:Usuario>
      </LoginResult>
    </LoginResponse>
  </s:Body>
</s:Envelope>"#
    )
}

#[allow(dead_code)]
pub fn fault_envelope(reason: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
  <s:Body>
    <s:Fault>
      <s:Code><s:Value>s:Sender</s:Value></s:Code>
      <s:Reason><s:Text xml:lang="pt-BR">{reason}</s:Text></s:Reason>
      <s:Detail><SegurancaSessaoFaultContract xmlns="http://schemas.datacontract.org/2004/07/Sseg"/></s:Detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#
    )
}

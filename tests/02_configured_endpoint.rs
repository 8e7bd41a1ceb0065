mod support;

use std::io::Write;

use sseg_gateway::{Credentials, EndpointSettings, SecurityGateway};
use tempfile::NamedTempFile;

#[tokio::test]
async fn settings_file_drives_headers_and_namespaces() {
    let server = support::start_sseg().await;
    support::reply_with(&server, 200, support::ticket_envelope("T9")).await;

    let toml = format!(
        r#"
        url = "{}{}"
        system_id = "BOLETO"
        send_timeout = "5s"
        security_mode = "none"
        service_namespace = "urn:sseg"
        header_namespace = "urn:sseg:headers"
        "#,
        server.uri(),
        support::SVC_PATH
    );
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();

    let settings = EndpointSettings::from_file_async(file.path()).await.unwrap();
    let gateway = SecurityGateway::connect(&settings).unwrap();
    assert_eq!(gateway.system_id(), "BOLETO");

    let ticket = gateway
        .login(&Credentials::new("bob", "s3cr&t"), "192.168.1.20", None)
        .await
        .unwrap();
    assert_eq!(ticket.field("id"), Some("T9"));

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains(r#"<sistemaOrigem xmlns="urn:sseg:headers">BOLETO</sistemaOrigem>"#));
    assert!(body.contains(r#"<origemIP xmlns="urn:sseg:headers">192.168.1.20</origemIP>"#));
    assert!(body.contains(r#"<Login xmlns="urn:sseg">"#));
    assert!(body.contains("<senha>s3cr&amp;t</senha>"));

    gateway.dispose();
}

#[test]
fn https_is_required_unless_security_is_disabled() {
    let err = EndpointSettings::parse(r#"url = "http://sseg.local/Seguranca.svc""#).unwrap_err();
    assert!(err.to_string().contains("requires https"));

    let settings = EndpointSettings::parse(
        r#"
        url = "http://sseg.local/Seguranca.svc"
        security_mode = "none"
        "#,
    )
    .unwrap();
    assert!(SecurityGateway::connect(&settings).is_ok());
}

mod support;

use std::time::Duration;

use sseg_gateway::{
    CallError, ChannelState, Credentials, FailureReason, LoginError, SecurityGateway,
    SecurityService,
};
use tokio::sync::watch;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

fn alice() -> Credentials {
    Credentials::new("alice", "pw123")
}

#[tokio::test]
async fn login_returns_ticket_from_service() {
    let server = support::start_sseg().await;

    Mock::given(method("POST"))
        .and(path(support::SVC_PATH))
        .and(body_string_contains(
            "<sistemaOrigem xmlns=\"ns\">SISTEMA</sistemaOrigem>",
        ))
        .and(body_string_contains("<origemIP xmlns=\"ns\">10.0.0.5</origemIP>"))
        .and(body_string_contains("<login>alice</login><senha>pw123</senha>"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(support::ticket_envelope("T1"), support::SOAP_CONTENT_TYPE),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = SecurityGateway::connect(&support::settings_for(&server)).unwrap();
    let ticket = gateway.login(&alice(), "10.0.0.5", None).await.unwrap();

    assert_eq!(ticket.field("id"), Some("T1"));
    assert_eq!(ticket.field("Usuario"), Some("alice"));

    let received = server.received_requests().await.unwrap();
    let content_type = received[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("application/soap+xml"));
    assert!(content_type.contains("action=\"http://tempuri.org/ISeguranca/Login\""));
}

#[tokio::test]
async fn empty_caller_ip_sends_no_origin_ip_header() {
    let server = support::start_sseg().await;
    support::reply_with(&server, 200, support::ticket_envelope("T2")).await;

    let gateway = SecurityGateway::connect(&support::settings_for(&server)).unwrap();
    gateway.login(&alice(), "", None).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains("<sistemaOrigem xmlns=\"ns\">SISTEMA</sistemaOrigem>"));
    assert!(!body.contains("origemIP"));
}

#[tokio::test]
async fn invalid_credentials_fault_keeps_channel_open() {
    let server = support::start_sseg().await;
    support::reply_with(
        &server,
        500,
        support::fault_envelope("SSEG_E029: Login / Senha inv&#225;lidos."),
    )
    .await;

    let gateway = SecurityGateway::connect(&support::settings_for(&server)).unwrap();
    let err = gateway.login(&alice(), "10.0.0.5", None).await.unwrap_err();

    assert_eq!(err.reason(), FailureReason::InvalidCredentials);
    assert_eq!(
        err.fault().map(|f| f.reason.as_str()),
        Some("SSEG_E029: Login / Senha inválidos.")
    );
    assert!(gateway.is_usable());
}

#[tokio::test]
async fn credential_in_use_fault_is_recognized() {
    let server = support::start_sseg().await;
    support::reply_with(
        &server,
        500,
        support::fault_envelope("Sseg_E026: credencial autenticada para outro endereco"),
    )
    .await;

    let gateway = SecurityGateway::connect(&support::settings_for(&server)).unwrap();
    let err = gateway.login(&alice(), "10.0.0.5", None).await.unwrap_err();

    assert_eq!(err.reason(), FailureReason::CredentialInUse);
}

#[tokio::test]
async fn unknown_fault_is_a_generic_rejection() {
    let server = support::start_sseg().await;
    support::reply_with(&server, 500, support::fault_envelope("SSEG_E099: conta bloqueada")).await;

    let gateway = SecurityGateway::connect(&support::settings_for(&server)).unwrap();
    let err = gateway.login(&alice(), "", None).await.unwrap_err();

    assert!(matches!(err, LoginError::Rejected(_)));
}

#[tokio::test]
async fn non_soap_error_page_is_a_transport_error() {
    let server = support::start_sseg().await;
    support::reply_with(&server, 502, "<html><body>Bad Gateway</body></html>".into()).await;

    let gateway = SecurityGateway::connect(&support::settings_for(&server)).unwrap();
    let err = gateway.login(&alice(), "", None).await.unwrap_err();

    match err {
        LoginError::Transport(CallError::Status(status)) => assert_eq!(status.as_u16(), 502),
        other => panic!("expected http status error, got {other:?}"),
    }
}

#[tokio::test]
async fn oversized_reply_is_refused() {
    let server = support::start_sseg().await;
    support::reply_with(&server, 200, support::ticket_envelope("T3")).await;

    let mut settings = support::settings_for(&server);
    settings.max_received_message_size = Some(64);
    let gateway = SecurityGateway::connect(&settings).unwrap();

    let err = gateway.login(&alice(), "", None).await.unwrap_err();
    assert!(matches!(
        err,
        LoginError::Transport(CallError::MessageTooLarge { limit: 64 })
    ));
}

#[tokio::test]
async fn send_timeout_faults_the_channel() {
    let server = support::start_sseg().await;
    support::reply_with_delay(
        &server,
        200,
        support::ticket_envelope("slow"),
        Duration::from_secs(3),
    )
    .await;

    let mut settings = support::settings_for(&server);
    settings.send_timeout = Duration::from_millis(200);
    let gateway = SecurityGateway::connect(&settings).unwrap();

    let err = gateway.login(&alice(), "", None).await.unwrap_err();
    match &err {
        LoginError::Transport(e) => assert!(e.is_timeout(), "expected timeout, got {e}"),
        other => panic!("expected transport error, got {other:?}"),
    }

    assert_eq!(gateway.service().state(), ChannelState::Faulted);
    assert!(!gateway.is_usable());

    let err = gateway.login(&alice(), "", None).await.unwrap_err();
    assert!(matches!(err, LoginError::Transport(CallError::Faulted)));

    // Faulted channels cannot close gracefully; dispose aborts instead.
    gateway.dispose();
    assert_eq!(gateway.service().state(), ChannelState::Closed);
}

#[tokio::test]
async fn cancellation_returns_promptly() {
    let server = support::start_sseg().await;
    support::reply_with_delay(
        &server,
        200,
        support::ticket_envelope("late"),
        Duration::from_secs(3),
    )
    .await;

    let gateway = SecurityGateway::connect(&support::settings_for(&server)).unwrap();
    let (cancel, signal) = watch::channel(false);

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.send_replace(true);
    });

    let started = std::time::Instant::now();
    let err = gateway
        .login(&alice(), "10.0.0.5", Some(signal))
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, LoginError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(gateway.is_usable());
}

#[tokio::test]
async fn dispose_twice_then_login_is_refused() {
    let server = support::start_sseg().await;
    support::reply_with(&server, 200, support::ticket_envelope("T4")).await;

    let gateway = SecurityGateway::connect(&support::settings_for(&server)).unwrap();
    gateway.dispose();
    gateway.dispose();

    assert_eq!(gateway.service().state(), ChannelState::Closed);
    let err = gateway.login(&alice(), "", None).await.unwrap_err();
    assert!(matches!(err, LoginError::Disposed));
    assert!(server.received_requests().await.unwrap().is_empty());
}

//! SMTP transport tests.
//!
//! Runs `SmtpTransport` against a scripted SMTP server on a local port.

use mailrelay::config::SmtpConfig;
use mailrelay::mail::{MailRelay, MailTransport, OutgoingMessage, SmtpTransport, TransportError};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// How the scripted server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Accept,
    RejectAuth,
    RejectRecipient,
}

/// Start a scripted SMTP server and return its port.
async fn spawn_smtp_server(script: Script) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_session(stream, script));
        }
    });

    port
}

async fn serve_session(stream: TcpStream, script: Script) {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    if write.write_all(b"220 localhost ESMTP test\r\n").await.is_err() {
        return;
    }

    while let Ok(Some(line)) = lines.next_line().await {
        let command = line.to_ascii_uppercase();

        let reply = if command.starts_with("EHLO") {
            "250-localhost\r\n250-AUTH PLAIN\r\n250 8BITMIME\r\n"
        } else if command.starts_with("AUTH") {
            match script {
                Script::RejectAuth => "535 5.7.8 Authentication credentials invalid\r\n",
                _ => "235 2.7.0 Authentication successful\r\n",
            }
        } else if command.starts_with("MAIL FROM") {
            "250 2.1.0 Ok\r\n"
        } else if command.starts_with("RCPT TO") {
            match script {
                Script::RejectRecipient => "550 5.1.1 No such user\r\n",
                _ => "250 2.1.5 Ok\r\n",
            }
        } else if command == "DATA" {
            if write.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await.is_err() {
                return;
            }
            while let Ok(Some(body_line)) = lines.next_line().await {
                if body_line == "." {
                    break;
                }
            }
            "250 2.0.0 Ok: queued\r\n"
        } else if command.starts_with("QUIT") {
            let _ = write.write_all(b"221 2.0.0 Bye\r\n").await;
            return;
        } else {
            "250 2.0.0 Ok\r\n"
        };

        if write.write_all(reply.as_bytes()).await.is_err() {
            return;
        }
    }
}

fn smtp_config(port: u16) -> SmtpConfig {
    SmtpConfig {
        host: "127.0.0.1".to_string(),
        port,
        tls: "none".to_string(),
        user: Some("relay@example.com".to_string()),
        pass: Some("secret".to_string()),
        timeout_secs: 5,
        ..SmtpConfig::default()
    }
}

fn message() -> OutgoingMessage {
    OutgoingMessage {
        from: "relay@example.com".to_string(),
        to: vec!["alice@example.com".to_string()],
        subject: "Hello".to_string(),
        text: Some("Hi Alice".to_string()),
        html: None,
        attachments: vec![],
    }
}

/// A port with nothing listening on it.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_send_returns_message_id() {
    let port = spawn_smtp_server(Script::Accept).await;
    let transport = SmtpTransport::from_config(&smtp_config(port)).unwrap();

    let message_id = transport.send(&message()).await.unwrap();

    assert!(message_id.starts_with('<'));
    assert!(message_id.ends_with("@example.com>"));
}

#[tokio::test]
async fn test_send_auth_failure() {
    let port = spawn_smtp_server(Script::RejectAuth).await;
    let transport = SmtpTransport::from_config(&smtp_config(port)).unwrap();

    let err = transport.send(&message()).await.unwrap_err();

    assert!(matches!(err, TransportError::Authentication(_)), "{err:?}");
    assert!(err.to_string().contains("535"));
}

#[tokio::test]
async fn test_send_recipient_rejected() {
    let port = spawn_smtp_server(Script::RejectRecipient).await;
    let transport = SmtpTransport::from_config(&smtp_config(port)).unwrap();

    let err = transport.send(&message()).await.unwrap_err();

    assert!(matches!(err, TransportError::Rejected(_)), "{err:?}");
    assert!(err.to_string().contains("550"));
}

#[tokio::test]
async fn test_send_connection_refused() {
    let port = closed_port().await;
    let transport = SmtpTransport::from_config(&smtp_config(port)).unwrap();

    let err = transport.send(&message()).await.unwrap_err();

    assert!(matches!(err, TransportError::Connection(_)), "{err:?}");
}

#[tokio::test]
async fn test_verify_reachable_server() {
    let port = spawn_smtp_server(Script::Accept).await;
    let transport = SmtpTransport::from_config(&smtp_config(port)).unwrap();

    assert!(transport.verify().await.is_ok());
}

#[tokio::test]
async fn test_verify_failures() {
    let port = spawn_smtp_server(Script::RejectAuth).await;
    let transport = SmtpTransport::from_config(&smtp_config(port)).unwrap();
    assert!(matches!(
        transport.verify().await,
        Err(TransportError::Authentication(_))
    ));

    let port = closed_port().await;
    let transport = SmtpTransport::from_config(&smtp_config(port)).unwrap();
    assert!(matches!(
        transport.verify().await,
        Err(TransportError::Connection(_))
    ));
}

#[tokio::test]
async fn test_relay_verify_reports_unreachable_server() {
    let port = closed_port().await;
    let transport = SmtpTransport::from_config(&smtp_config(port)).unwrap();
    let relay = MailRelay::new(Arc::new(transport), "relay@example.com");

    assert!(matches!(
        relay.verify().await,
        Err(TransportError::Connection(_))
    ));
}

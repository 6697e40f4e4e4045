// crates/tws-client/tests/connection.rs
mod common;

use common::*;
use tws_client::ClientError;
use tws_core::ConnectionState;

#[tokio::test]
async fn handshake_negotiates_version_and_starts_api() {
    let (client, recorder) = new_client();
    let (stream, mut terminal) = duplex_pair();

    let (res, (hello, start_api)) = tokio::join!(client.connect_with_stream(stream, 7), async {
        let hello = terminal.read_hello().await;
        terminal.reply_handshake("176").await;
        (hello, terminal.read_fields().await)
    });

    res.unwrap();
    assert_eq!(hello, "v100..203");
    assert_eq!(start_api, vec!["71", "2", "7", ""]);

    assert!(client.is_connected());
    assert_eq!(client.connection_state(), ConnectionState::Connected);
    assert_eq!(client.server_version(), 176);
    assert_eq!(client.connection_time().as_deref(), Some(CONNECTION_TIME));
    assert_eq!(client.client_id(), Some(7));
    assert_eq!(recorder.events(), vec![Event::ConnectAck]);
}

#[tokio::test]
async fn connect_options_and_capabilities_are_sent() {
    let (client, _recorder) = new_client();
    client.set_connect_options("+PACEAPI");
    client.set_optional_capabilities("cap1");
    let (stream, mut terminal) = duplex_pair();

    let (res, (hello, start_api)) = tokio::join!(client.connect_with_stream(stream, 3), async {
        let hello = terminal.read_hello().await;
        terminal.reply_handshake("150").await;
        (hello, terminal.read_fields().await)
    });

    res.unwrap();
    assert_eq!(hello, "v100..203 +PACEAPI");
    assert_eq!(start_api, vec!["71", "2", "3", "cap1"]);
}

#[tokio::test]
async fn frames_that_are_not_the_reply_are_skipped() {
    let (client, recorder) = new_client();
    let (stream, mut terminal) = duplex_pair();

    let (res, _) = tokio::join!(client.connect_with_stream(stream, 0), async {
        terminal.read_hello().await;
        terminal.send_fields(&["x", "y", "z"]).await;
        terminal.send_fields(&["lonely"]).await;
        terminal.reply_handshake("150").await;
        terminal.read_payload().await
    });

    res.unwrap();
    assert_eq!(client.server_version(), 150);
    assert!(recorder.errors().is_empty());
}

#[tokio::test]
async fn close_during_handshake_resets_without_error_callback() {
    let (client, recorder) = new_client();
    let (stream, mut terminal) = duplex_pair();

    let (res, _) = tokio::join!(client.connect_with_stream(stream, 0), async move {
        terminal.read_hello().await;
        drop(terminal);
    });

    assert!(matches!(res, Err(ClientError::ConnectionClosed)));
    assert!(!client.is_connected());
    assert_eq!(client.server_version(), 0);
    assert_eq!(recorder.events(), vec![Event::ConnectionClosed]);
}

#[tokio::test]
async fn unsupported_version_is_reported_and_disconnects() {
    let (client, recorder) = new_client();
    let (stream, mut terminal) = duplex_pair();

    let (res, _) = tokio::join!(client.connect_with_stream(stream, 0), async {
        terminal.read_hello().await;
        terminal.reply_handshake("99").await;
    });

    assert!(matches!(res, Err(ClientError::UnsupportedVersion(99))));
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    let errors = recorder.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].1, 506);
    assert_eq!(recorder.events().last(), Some(&Event::ConnectionClosed));
}

#[tokio::test]
async fn second_connect_is_rejected() {
    let (client, recorder, _terminal) = connected(150).await;
    let (stream, _other) = duplex_pair();

    let res = client.connect_with_stream(stream, 1).await;

    assert!(matches!(res, Err(ClientError::AlreadyConnected)));
    assert!(client.is_connected());
    assert_eq!(recorder.errors(), vec![(-1, 501, "Already connected.".to_string())]);
}

#[tokio::test]
async fn bad_connect_options_report_invalid_symbol_even_when_connected() {
    let (client, recorder, _terminal) = connected(150).await;
    client.set_connect_options("bad\u{1}");
    let (stream, _other) = duplex_pair();

    let res = client.connect_with_stream(stream, 1).await;

    assert!(matches!(res, Err(ClientError::InvalidSymbol(_))));
    assert!(client.is_connected());
    assert_eq!(
        recorder.errors(),
        vec![(-1, 579, "Invalid symbol in string - bad\u{1}".to_string())]
    );
}

#[tokio::test]
async fn refused_tcp_connect_reports_connect_fail_and_disconnects() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (client, recorder) = new_client();

    let res = client.connect("127.0.0.1", port, 0).await;

    assert!(matches!(res, Err(ClientError::ConnectFailed(_))));
    let errors = recorder.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!((errors[0].0, errors[0].1), (-1, 502));
    assert_eq!(recorder.events().last(), Some(&Event::ConnectionClosed));
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn non_printable_host_fails_without_connecting() {
    let (client, recorder) = new_client();

    let res = client.connect("local\u{1}host", 7497, 0).await;

    assert!(matches!(res, Err(ClientError::InvalidSymbol(_))));
    assert_eq!(
        recorder.errors(),
        vec![(-1, 579, "Invalid symbol in string - local\u{1}host".to_string())]
    );
    assert!(!recorder.events().contains(&Event::ConnectionClosed));
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn non_printable_connect_options_fail_before_any_io() {
    let (client, recorder) = new_client();
    client.set_connect_options("bad\u{1}option");
    let (stream, mut terminal) = duplex_pair();

    let res = client.connect_with_stream(stream, 0).await;

    assert!(matches!(res, Err(ClientError::InvalidSymbol(_))));
    assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    let errors = recorder.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].1, 579);
    assert!(errors[0].2.starts_with("Invalid symbol in string - "));

    drop(res);
    assert!(terminal.read_to_end().await.is_empty());
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let (client, recorder, mut terminal) = connected(150).await;

    client.disconnect().await;
    client.disconnect().await;

    assert!(!client.is_connected());
    assert_eq!(
        recorder.count(|e| *e == Event::ConnectionClosed),
        1,
        "connection_closed fires once"
    );
    assert!(terminal.read_to_end().await.is_empty());
}

#[tokio::test]
async fn reconnect_after_disconnect() {
    let (client, recorder, _terminal) = connected(150).await;
    client.disconnect().await;

    let (stream, mut terminal) = duplex_pair();
    let (res, _) = tokio::join!(client.connect_with_stream(stream, 2), async {
        terminal.read_hello().await;
        terminal.reply_handshake("160").await;
        terminal.read_payload().await
    });

    res.unwrap();
    assert_eq!(client.server_version(), 160);
    assert_eq!(client.client_id(), Some(2));
    assert_eq!(recorder.count(|e| *e == Event::ConnectAck), 2);
}

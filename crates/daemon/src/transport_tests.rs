// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use tokio::io::AsyncWriteExt;

async fn collect_lines(mut server: impl AsyncRead + Unpin) -> Vec<serde_json::Value> {
    let mut buf = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut server, &mut buf).await.unwrap();
    String::from_utf8(buf)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn dispatches_requests_and_writes_responses_in_order_received() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register("echo", |args| async move { Ok(args) });
    let dispatcher = Arc::new(dispatcher);

    let (mut client_in, server_in) = tokio::io::duplex(4096);
    let (client_out, mut server_out) = tokio::io::duplex(4096);
    let sink = Arc::new(ResponseSink::new(client_out));

    client_in
        .write_all(b"{\"id\":1,\"op\":\"echo\",\"args\":{\"n\":1}}\n")
        .await
        .unwrap();
    drop(client_in);

    run_transport(server_in, sink, dispatcher).await;

    let responses = collect_lines(server_out).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["result"], json!({"n": 1}));
}

#[tokio::test]
async fn malformed_line_produces_error_response_with_null_id() {
    let dispatcher = Arc::new(Dispatcher::new());

    let (mut client_in, server_in) = tokio::io::duplex(4096);
    let (client_out, server_out) = tokio::io::duplex(4096);
    let sink = Arc::new(ResponseSink::new(client_out));

    client_in.write_all(b"not json\n").await.unwrap();
    drop(client_in);

    run_transport(server_in, sink, dispatcher).await;

    let responses = collect_lines(server_out).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], json!(null));
    assert_eq!(responses[0]["error"]["code"], json!("BAD_REQUEST"));
}

#[tokio::test]
async fn unknown_operation_still_gets_a_response() {
    let dispatcher = Arc::new(Dispatcher::new());

    let (mut client_in, server_in) = tokio::io::duplex(4096);
    let (client_out, server_out) = tokio::io::duplex(4096);
    let sink = Arc::new(ResponseSink::new(client_out));

    client_in
        .write_all(b"{\"id\":7,\"op\":\"nonexistent\"}\n")
        .await
        .unwrap();
    drop(client_in);

    run_transport(server_in, sink, dispatcher).await;

    let responses = collect_lines(server_out).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], json!(7));
    assert_eq!(responses[0]["error"]["code"], json!("BAD_REQUEST"));
}

#[tokio::test]
async fn eof_waits_for_slow_in_flight_dispatch_before_returning() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register("slow", |_args| async move {
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        Ok(json!("done"))
    });
    let dispatcher = Arc::new(dispatcher);

    let (mut client_in, server_in) = tokio::io::duplex(4096);
    let (client_out, server_out) = tokio::io::duplex(4096);
    let sink = Arc::new(ResponseSink::new(client_out));

    client_in.write_all(b"{\"id\":1,\"op\":\"slow\"}\n").await.unwrap();
    drop(client_in);

    run_transport(server_in, sink, dispatcher).await;

    let responses = collect_lines(server_out).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["result"], json!("done"));
}

#[tokio::test]
async fn all_concurrent_requests_get_a_response_even_if_out_of_order() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register("maybe_slow", |args| async move {
        let n = args["n"].as_i64().unwrap_or(0);
        if n == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        Ok(json!({"n": n}))
    });
    let dispatcher = Arc::new(dispatcher);

    let (mut client_in, server_in) = tokio::io::duplex(8192);
    let (client_out, server_out) = tokio::io::duplex(8192);
    let sink = Arc::new(ResponseSink::new(client_out));

    for i in 0..3 {
        let line = format!("{{\"id\":{i},\"op\":\"maybe_slow\",\"args\":{{\"n\":{i}}}}}\n");
        client_in.write_all(line.as_bytes()).await.unwrap();
    }
    drop(client_in);

    run_transport(server_in, sink, dispatcher).await;

    let mut responses = collect_lines(server_out).await;
    responses.sort_by_key(|r| r["id"].as_i64().unwrap());
    assert_eq!(responses.len(), 3);
    for (i, response) in responses.iter().enumerate() {
        assert_eq!(response["result"]["n"], json!(i as i64));
    }
}

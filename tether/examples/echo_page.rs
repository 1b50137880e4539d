//! Echo Page Example
//!
//! Drives a small page against a loopback transport:
//! - A link whose clicks become server events
//! - A text input with a live character counter
//! - Printed batches and drained notices once the runtime winds down

use std::fs::File;
use std::sync::Arc;

use pagedom::{Document, Modifiers, Node, UiEvent, keys};
use serde_json::json;
use simplelog::{Config, LevelFilter, WriteLogger};
use tether::channel::ChannelConfig;
use tether::envelope::Cid;
use tether::page::HostEvent;
use tether::params::Params;
use tether::runtime::Runtime;
use tether::session::Session;
use tether::transport::Loopback;

fn sample_tree() -> Node {
    Node::div()
        .id("page")
        .child(
            Node::anchor()
                .id("refresh")
                .component("refresh")
                .attr("href", "/refresh")
                .text("Refresh"),
        )
        .child(
            Node::div()
                .id("name")
                .component("name")
                .child(Node::input().id("name_input"))
                .child(Node::span().id("name_input_count")),
        )
}

#[tokio::main]
async fn main() {
    // Set up file logging
    let log_file = File::create("echo_page.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Trace, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let transport = Arc::new(Loopback::new(|body| {
        println!("-> {body}");
        Ok(json!({}))
    }));
    let (mut runtime, host) = Runtime::new(
        Document::new(sample_tree()),
        Session::generate(),
        transport,
        ChannelConfig::default(),
    );

    let page = runtime.page_mut();
    page.init_component(
        Cid::new("refresh"),
        "link",
        Params::new().with("event_name", json!("refresh")),
    )
    .expect("Failed to init link");
    page.init_component(
        Cid::new("name"),
        "text_input",
        Params::new()
            .with("show_count", json!(true))
            .with("max_length", json!(20)),
    )
    .expect("Failed to init text input");

    host.send(HostEvent::Ui(UiEvent::click("refresh"))).unwrap();
    host.send(HostEvent::Ui(UiEvent::change("name_input", "hello")))
        .unwrap();
    host.send(HostEvent::Ui(UiEvent::key_up(
        "name_input",
        keys::KEY_A,
        Modifiers::new(),
    )))
    .unwrap();
    drop(host);

    let mut page = runtime.run().await;

    println!(
        "counter reads: {}",
        page.document().text_of("name_input_count").unwrap_or("?")
    );
    for notice in page.take_notices() {
        println!("[{:?}] {}", notice.level, notice.message);
    }
}

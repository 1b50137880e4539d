use pagedom::{Document, Modifiers, Node, UiEvent, keys};
use serde_json::{Value, json};
use tether::channel::{ChannelConfig, TransportOutcome, WireJob};
use tether::components::number_input::key_allowed;
use tether::envelope::Cid;
use tether::page::{HostEvent, Page};
use tether::params::Params;
use tether::session::{Session, TransactionId};
use tether::transport::TransportError;
use tokio::sync::mpsc;

fn page_with(root: Node) -> (Page, mpsc::UnboundedReceiver<WireJob>) {
    let (jobs, rx) = mpsc::unbounded_channel();
    let session = Session::begin(TransactionId::new("tid-test"));
    let page = Page::new(Document::new(root), session, ChannelConfig::default(), jobs);
    (page, rx)
}

fn respond_ok(page: &mut Page, job: WireJob, data: Value) {
    page.on_transport_result(TransportOutcome {
        eids: job.eids,
        cid: job.cid,
        result: Ok(data),
    });
}

fn respond_err(page: &mut Page, job: WireJob) {
    page.on_transport_result(TransportOutcome {
        eids: job.eids,
        cid: job.cid,
        result: Err(TransportError::Rejected(502)),
    });
}

fn first_event(job: &WireJob) -> &Value {
    &job.body["q"][0]
}

fn sent_value(job: &WireJob) -> String {
    first_event(job)["p"]["value"].as_str().unwrap().to_owned()
}

// ============================================================================
// Keystroke filter
// ============================================================================

#[test]
fn test_digits_always_pass() {
    for code in keys::DIGIT_0..=keys::DIGIT_9 {
        assert!(key_allowed(code, false, false));
    }
}

#[test]
fn test_letters_are_rejected() {
    assert!(!key_allowed(keys::KEY_A, false, false));
    assert!(!key_allowed(72, true, false));
}

#[test]
fn test_navigation_and_editing_keys_pass() {
    for code in [
        keys::BACKSPACE,
        keys::DELETE,
        keys::TAB,
        keys::ENTER,
        keys::ESCAPE,
        keys::HOME,
        keys::END,
        keys::ARROW_LEFT,
        keys::ARROW_RIGHT,
        keys::MINUS,
    ] {
        assert!(key_allowed(code, false, false));
    }
}

#[test]
fn test_decimal_point_needs_float_mode() {
    assert!(!key_allowed(keys::PERIOD, false, false));
    assert!(key_allowed(keys::PERIOD, true, false));
    // The numpad decimal is an editing key and passes either way.
    assert!(key_allowed(keys::NUMPAD_DECIMAL, false, false));
}

#[test]
fn test_clipboard_needs_ctrl() {
    for code in [keys::KEY_A, keys::KEY_C, keys::KEY_V, keys::KEY_X] {
        assert!(!key_allowed(code, false, false));
        assert!(key_allowed(code, false, true));
    }
}

// ============================================================================
// Number input
// ============================================================================

fn number_tree(float: bool) -> Node {
    let mut input = Node::input().id("n1_input");
    if float {
        input = input.attr("data-validation-type", "float");
    }
    Node::div().id("n1").component("n1").child(input)
}

fn number_page(float: bool) -> (Page, mpsc::UnboundedReceiver<WireJob>) {
    let (mut page, rx) = page_with(number_tree(float));
    page.init_component(Cid::new("n1"), "number_input", Params::new())
        .unwrap();
    (page, rx)
}

#[test]
fn test_letter_keystrokes_are_suppressed() {
    let (mut page, _rx) = number_page(false);

    let key = |code| HostEvent::Ui(UiEvent::key_down("n1_input", code, Modifiers::new()));
    assert!(page.dispatch(key(keys::KEY_A)).default_prevented);
    assert!(!page.dispatch(key(keys::DIGIT_0 + 5)).default_prevented);
    assert!(!page.dispatch(key(keys::BACKSPACE)).default_prevented);
}

#[test]
fn test_decimal_point_follows_the_rendered_validation_type() {
    let (mut page, _rx) = number_page(false);
    let period = HostEvent::Ui(UiEvent::key_down("n1_input", keys::PERIOD, Modifiers::new()));
    assert!(page.dispatch(period).default_prevented);

    let (mut page, _rx) = number_page(true);
    let period = HostEvent::Ui(UiEvent::key_down("n1_input", keys::PERIOD, Modifiers::new()));
    assert!(!page.dispatch(period).default_prevented);
}

#[test]
fn test_held_ctrl_enables_clipboard_keys() {
    let (mut page, _rx) = number_page(false);
    let down = |code| HostEvent::Ui(UiEvent::key_down("n1_input", code, Modifiers::new()));
    let up = |code| HostEvent::Ui(UiEvent::key_up("n1_input", code, Modifiers::new()));

    page.dispatch(down(keys::CTRL));
    assert!(!page.dispatch(down(keys::KEY_A)).default_prevented);
    page.dispatch(up(keys::CTRL));
    assert!(page.dispatch(down(keys::KEY_A)).default_prevented);
}

#[test]
fn test_modifier_flag_enables_clipboard_keys() {
    let (mut page, _rx) = number_page(false);
    let paste = HostEvent::Ui(UiEvent::key_down("n1_input", keys::KEY_V, Modifiers::ctrl()));
    assert!(!page.dispatch(paste).default_prevented);
}

#[test]
fn test_blur_reports_the_rendered_value() {
    let (mut page, mut rx) = number_page(false);
    page.document_mut().set_value("n1_input", "42").unwrap();

    page.dispatch(HostEvent::Ui(UiEvent::blur("n1_input")));

    let job = rx.try_recv().expect("change envelope");
    assert_eq!(first_event(&job)["e"], json!("change"));
    assert_eq!(sent_value(&job), "42");
}

#[test]
fn test_changes_coalesce_while_one_is_in_flight() {
    let (mut page, mut rx) = number_page(false);

    page.dispatch(HostEvent::Ui(UiEvent::change("n1_input", "1")));
    let first = rx.try_recv().expect("first change goes out");
    assert_eq!(sent_value(&first), "1");

    // Newer values pile into one waiting slot.
    page.dispatch(HostEvent::Ui(UiEvent::change("n1_input", "12")));
    page.dispatch(HostEvent::Ui(UiEvent::change("n1_input", "123")));
    assert!(rx.try_recv().is_err());

    respond_ok(&mut page, first, json!({}));
    let flushed = rx.try_recv().expect("latest value flushes");
    assert_eq!(sent_value(&flushed), "123");

    respond_ok(&mut page, flushed, json!({}));
    assert!(rx.try_recv().is_err());
    assert!(page.is_idle());
}

#[test]
fn test_failure_drops_the_queued_value() {
    let (mut page, mut rx) = number_page(false);

    page.dispatch(HostEvent::Ui(UiEvent::change("n1_input", "1")));
    let first = rx.try_recv().unwrap();
    page.dispatch(HostEvent::Ui(UiEvent::change("n1_input", "12")));

    respond_err(&mut page, first);

    // Nothing is retried on its own; the failure surfaced as a notice.
    assert!(rx.try_recv().is_err());
    let notices = page.take_notices();
    assert_eq!(notices.len(), 1);

    // The next observed change starts a fresh cycle.
    page.dispatch(HostEvent::Ui(UiEvent::change("n1_input", "12")));
    let retry = rx.try_recv().expect("fresh change goes out");
    assert_eq!(sent_value(&retry), "12");
}

// ============================================================================
// Radio
// ============================================================================

#[test]
fn test_reselecting_the_current_value_sends_nothing() {
    let tree = Node::div().id("r1").component("r1").value("a");
    let (mut page, mut rx) = page_with(tree);
    page.init_component(Cid::new("r1"), "radio", Params::new())
        .unwrap();

    page.dispatch(HostEvent::Ui(UiEvent::change("r1", "a")));
    assert!(rx.try_recv().is_err());

    page.dispatch(HostEvent::Ui(UiEvent::change("r1", "b")));
    let job = rx.try_recv().expect("real change goes out");
    assert_eq!(sent_value(&job), "b");
    respond_ok(&mut page, job, json!({}));

    page.dispatch(HostEvent::Ui(UiEvent::change("r1", "b")));
    assert!(rx.try_recv().is_err());
}

// ============================================================================
// Text input: counter and submit
// ============================================================================

fn text_tree() -> Node {
    Node::div()
        .id("tx")
        .component("tx")
        .child(
            Node::input()
                .id("tx_input")
                .value("hello")
                .attr("data-initial-value", "hello"),
        )
        .child(Node::span().id("tx_input_count"))
        .child(Node::div().id("tx_typeahead"))
}

fn text_page(params: Params) -> (Page, mpsc::UnboundedReceiver<WireJob>) {
    let (mut page, rx) = page_with(text_tree());
    page.init_component(Cid::new("tx"), "text_input", params)
        .unwrap();
    (page, rx)
}

#[test]
fn test_counter_mirrors_the_value_length() {
    let (mut page, _rx) = text_page(
        Params::new()
            .with("show_count", json!(true))
            .with("max_length", json!(10)),
    );

    page.dispatch(HostEvent::Ui(UiEvent::key_up(
        "tx_input",
        keys::KEY_A,
        Modifiers::new(),
    )));

    assert_eq!(page.document().text_of("tx_input_count"), Some("5"));
}

#[test]
fn test_counter_without_max_length_stays_quiet() {
    let (mut page, _rx) = text_page(Params::new().with("show_count", json!(true)));

    page.dispatch(HostEvent::Ui(UiEvent::key_up(
        "tx_input",
        keys::KEY_A,
        Modifiers::new(),
    )));

    assert_eq!(page.document().text_of("tx_input_count"), Some(""));
}

#[test]
fn test_enter_submits_when_configured() {
    let (mut page, mut rx) = text_page(Params::new().with("submit_form_on_enter", json!(true)));

    page.dispatch(HostEvent::Ui(UiEvent::key_up(
        "tx_input",
        keys::ENTER,
        Modifiers::new(),
    )));

    // The final value goes first; submit waits in the cid lane.
    let change = rx.try_recv().expect("change envelope");
    assert_eq!(first_event(&change)["e"], json!("change"));
    assert_eq!(sent_value(&change), "hello");
    assert!(rx.try_recv().is_err());

    respond_ok(&mut page, change, json!({}));
    let submit = rx.try_recv().expect("queued submit flushes");
    assert_eq!(first_event(&submit)["e"], json!("submit"));
}

#[test]
fn test_enter_without_the_flag_does_nothing() {
    let (mut page, mut rx) = text_page(Params::new());

    page.dispatch(HostEvent::Ui(UiEvent::key_up(
        "tx_input",
        keys::ENTER,
        Modifiers::new(),
    )));

    assert!(rx.try_recv().is_err());
}

// ============================================================================
// Text input: response extras
// ============================================================================

#[test]
fn test_rerendered_value_fires_exactly_one_change() {
    let (mut page, mut rx) = text_page(Params::new());

    page.document_mut().set_value("tx_input", "typed").unwrap();
    page.dispatch(HostEvent::Ui(UiEvent::change("tx_input", "typed")));
    let job = rx.try_recv().unwrap();

    // The server re-renders the input behind our back.
    page.document_mut()
        .set_value("tx_input", "server-set")
        .unwrap();
    respond_ok(&mut page, job, json!({}));

    let drift = rx.try_recv().expect("drift reported as one change");
    assert_eq!(sent_value(&drift), "server-set");
    assert_eq!(
        page.document().attr_of("tx_input", "data-initial-value"),
        Some("server-set")
    );

    // Settling the drift change finds the marker already moved.
    respond_ok(&mut page, drift, json!({}));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_date_input_is_marked_for_enhancement() {
    let (mut page, mut rx) = text_page(Params::new().with("date", json!(true)));

    page.dispatch(HostEvent::Ui(UiEvent::change("tx_input", "hello")));
    let job = rx.try_recv().unwrap();
    respond_ok(&mut page, job, json!({}));

    assert_eq!(
        page.document().attr_of("tx_input", "data-enhance"),
        Some("datetimepicker")
    );
}

// ============================================================================
// Typeahead
// ============================================================================

fn typeahead_page(value: &str) -> (Page, mpsc::UnboundedReceiver<WireJob>) {
    let (mut page, rx) = page_with(text_tree());
    page.document_mut().set_value("tx_input", value).unwrap();
    page.document_mut()
        .set_attr("tx_input", "data-initial-value", value)
        .unwrap();
    page.init_component(
        Cid::new("tx"),
        "text_input",
        Params::new()
            .with("typeahead", json!(true))
            .with("type_func", json!("lookup_names")),
    )
    .unwrap();
    (page, rx)
}

fn keystroke(page: &mut Page) {
    page.dispatch(HostEvent::Ui(UiEvent::key_up(
        "tx_input",
        keys::KEY_A,
        Modifiers::new(),
    )));
}

fn suggestion_labels(page: &Page) -> Vec<String> {
    page.document()
        .find("tx_typeahead")
        .unwrap()
        .children
        .iter()
        .map(|n| n.text.clone())
        .collect()
}

#[test]
fn test_keystrokes_ask_the_server_for_suggestions() {
    let (mut page, mut rx) = typeahead_page("al");

    keystroke(&mut page);

    let job = rx.try_recv().expect("lookup envelope");
    assert_eq!(first_event(&job)["e"], json!("lookup_names"));
    assert_eq!(first_event(&job)["p"], json!({ "query": "al" }));
}

#[test]
fn test_suggestions_are_ranked_and_written_to_the_region() {
    let (mut page, mut rx) = typeahead_page("al");
    keystroke(&mut page);
    let job = rx.try_recv().unwrap();

    respond_ok(
        &mut page,
        job,
        json!([["1", "beta"], ["2", "alpha"], ["3", "alphabet"]]),
    );

    let labels = suggestion_labels(&page);
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&"alpha".to_owned()));
    assert!(labels.contains(&"alphabet".to_owned()));

    let region = page.document().find("tx_typeahead").unwrap();
    for child in &region.children {
        assert!(child.has_class("typeahead-item"));
        assert!(child.get_attr("data-id").is_some());
    }
}

#[test]
fn test_empty_query_keeps_the_server_order() {
    let (mut page, mut rx) = typeahead_page("");
    keystroke(&mut page);
    let job = rx.try_recv().unwrap();

    respond_ok(&mut page, job, json!([["1", "zulu"], ["2", "alpha"]]));

    assert_eq!(suggestion_labels(&page), vec!["zulu", "alpha"]);
}

#[test]
fn test_malformed_suggestions_clear_the_region() {
    let (mut page, mut rx) = typeahead_page("al");
    page.document_mut()
        .find_mut("tx_typeahead")
        .unwrap()
        .children
        .push(Node::anchor().text("leftover"));

    keystroke(&mut page);
    let job = rx.try_recv().unwrap();
    respond_ok(&mut page, job, json!({ "unexpected": "shape" }));

    assert!(suggestion_labels(&page).is_empty());
}

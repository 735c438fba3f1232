//! End-to-end scenarios driving [`Driver`] with a scripted chat model.
//!
//! Each scenario reconstructs a fresh [`Driver`] per turn, sharing the
//! same `thread_id` and [`InMemoryCheckpointer`] across turns — the
//! checkpointer, not the `Driver` value, is what survives between
//! `go()` calls in a real host. A fresh [`ScriptedChatModel`] per turn
//! stands in for reloading a mock LLM with the next turn's scripted
//! response.

use chatfield_core::{chatfield, Collection};
use chatfield_graph::{Checkpointer, Driver, DriverConfig, InMemoryCheckpointer};
use chatfield_llm::{Message, ScriptedChatModel, ToolCall};
use std::sync::Arc;

fn trip_collection() -> Collection {
    chatfield()
        .type_name("Trip")
        .field("destination")
        .desc("Where to?")
        .build()
        .unwrap()
}

fn signup_collection() -> Collection {
    chatfield()
        .type_name("Signup")
        .field("age")
        .desc("How old are you?")
        .must("be between 0 and 120")
        .as_int()
        .build()
        .unwrap()
}

fn order_collection() -> Collection {
    chatfield()
        .type_name("Order")
        .field("tier")
        .desc("Which plan?")
        .as_one("plan", ["basic", "pro", "enterprise"])
        .build()
        .unwrap()
}

fn survey_collection() -> Collection {
    chatfield()
        .type_name("Survey")
        .field("name")
        .desc("Your name?")
        .field("concerns_raised")
        .desc("Any concerns raised?")
        .confidential()
        .as_bool()
        .build()
        .unwrap()
}

fn intake_collection() -> Collection {
    chatfield()
        .type_name("Intake")
        .field("q1")
        .desc("First question")
        .field("q2")
        .desc("Second question")
        .field("summary")
        .desc("Summarize the conversation")
        .conclude()
        .build()
        .unwrap()
}

fn tool_call(id: &str, name: impl Into<String>, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.into(),
        arguments,
    }
}

/// Scenario 1: single text field.
#[tokio::test]
async fn scenario_1_single_text_field() {
    let collection = trip_collection();
    let update_tool = format!("update_{}", collection.id());
    let config = DriverConfig::new().with_thread_id("scenario-1");
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(InMemoryCheckpointer::new());

    let llm = Arc::new(ScriptedChatModel::new(vec![Message::assistant("Where to?")]));
    let driver = Driver::new(collection, config.clone(), llm)
        .unwrap()
        .with_checkpointer(checkpointer.clone());
    assert_eq!(driver.go(None).await.unwrap(), "Where to?");

    let llm = Arc::new(ScriptedChatModel::new(vec![
        Message::assistant_with_tool_calls(
            "",
            vec![tool_call(
                "call_1",
                update_tool,
                serde_json::json!({
                    "destination": { "value": "Kyoto", "context": "user said Kyoto", "as_quote": "Kyoto" }
                }),
            )],
        ),
        Message::assistant("Great, anything else?"),
    ]));
    let driver = Driver::new(trip_collection(), config, llm)
        .unwrap()
        .with_checkpointer(checkpointer);
    let reply = driver.go(Some("Kyoto")).await.unwrap();
    assert_eq!(reply, "Great, anything else?");

    let shared = driver.collection();
    let snapshot = shared.read().await;
    assert_eq!(&*snapshot.field("destination").unwrap(), "Kyoto");
    assert!(snapshot.is_done());
}

/// Scenario 2: validation rejection, then a corrected retry.
#[tokio::test]
async fn scenario_2_validation_rejection_then_retry() {
    let update_tool = format!("update_{}", signup_collection().id());
    let config = DriverConfig::new().with_thread_id("scenario-2");
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(InMemoryCheckpointer::new());

    let llm = Arc::new(ScriptedChatModel::new(vec![Message::assistant("How old are you?")]));
    Driver::new(signup_collection(), config.clone(), llm)
        .unwrap()
        .with_checkpointer(checkpointer.clone())
        .go(None)
        .await
        .unwrap();

    let llm = Arc::new(ScriptedChatModel::new(vec![Message::assistant(
        "That can't be negative; how old?",
    )]));
    let driver = Driver::new(signup_collection(), config.clone(), llm)
        .unwrap()
        .with_checkpointer(checkpointer.clone());
    let reply = driver.go(Some("-5")).await.unwrap();
    assert_eq!(reply, "That can't be negative; how old?");
    assert!(driver.collection().read().await.field("age").unwrap().value().is_none());

    let llm = Arc::new(ScriptedChatModel::new(vec![
        Message::assistant_with_tool_calls(
            "",
            vec![tool_call(
                "call_1",
                update_tool,
                serde_json::json!({
                    "age": { "value": "30", "context": "", "as_quote": "", "as_int": 30 }
                }),
            )],
        ),
        Message::assistant("Thanks!"),
    ]));
    let driver = Driver::new(signup_collection(), config, llm)
        .unwrap()
        .with_checkpointer(checkpointer);
    let reply = driver.go(Some("30")).await.unwrap();
    assert_eq!(reply, "Thanks!");

    let shared = driver.collection();
    let snapshot = shared.read().await;
    assert_eq!(&*snapshot.field("age").unwrap(), "30");
    assert_eq!(snapshot.field("age").unwrap().as_int(), Some(30));
}

/// Scenario 3: choice cast (exactly-one).
#[tokio::test]
async fn scenario_3_choice_cast_exactly_one() {
    let update_tool = format!("update_{}", order_collection().id());
    let config = DriverConfig::new().with_thread_id("scenario-3");
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(InMemoryCheckpointer::new());

    let llm = Arc::new(ScriptedChatModel::new(vec![Message::assistant("Which plan?")]));
    Driver::new(order_collection(), config.clone(), llm)
        .unwrap()
        .with_checkpointer(checkpointer.clone())
        .go(None)
        .await
        .unwrap();

    let llm = Arc::new(ScriptedChatModel::new(vec![
        Message::assistant_with_tool_calls(
            "",
            vec![tool_call(
                "call_1",
                update_tool,
                serde_json::json!({
                    "tier": {
                        "value": "pro",
                        "context": "",
                        "as_quote": "",
                        "choose_exactly_one_plan": "pro",
                    }
                }),
            )],
        ),
        Message::assistant("Noted, pro plan."),
    ]));
    let driver = Driver::new(order_collection(), config, llm)
        .unwrap()
        .with_checkpointer(checkpointer);
    let reply = driver.go(Some("pro plan please")).await.unwrap();
    assert_eq!(reply, "Noted, pro plan.");

    let shared = driver.collection();
    let snapshot = shared.read().await;
    assert_eq!(snapshot.field("tier").unwrap().as_one("plan"), Some("pro"));
}

/// Scenario 4: confidential field, digested to N/A after `_enough`.
#[tokio::test]
async fn scenario_4_confidential_field_digest() {
    let update_tool = format!("update_{}", survey_collection().id());
    let confidential_tool = format!("updateConfidential_{}", survey_collection().id());
    let config = DriverConfig::new().with_thread_id("scenario-4");
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(InMemoryCheckpointer::new());

    let llm = Arc::new(ScriptedChatModel::new(vec![Message::assistant("What's your name?")]));
    Driver::new(survey_collection(), config.clone(), llm)
        .unwrap()
        .with_checkpointer(checkpointer.clone())
        .go(None)
        .await
        .unwrap();

    let llm = Arc::new(ScriptedChatModel::new(vec![
        Message::assistant_with_tool_calls(
            "",
            vec![tool_call(
                "call_1",
                update_tool,
                serde_json::json!({ "name": { "value": "Alice", "context": "", "as_quote": "" } }),
            )],
        ),
        Message::assistant_with_tool_calls(
            "",
            vec![tool_call(
                "call_2",
                confidential_tool,
                serde_json::json!({
                    "concerns_raised": { "value": "N/A", "context": "", "as_quote": "", "as_bool": false }
                }),
            )],
        ),
        Message::assistant("Great, thanks Alice!"),
    ]));
    let driver = Driver::new(survey_collection(), config, llm)
        .unwrap()
        .with_checkpointer(checkpointer);
    let reply = driver.go(Some("I'm Alice")).await.unwrap();
    assert_eq!(reply, "Great, thanks Alice!");

    let shared = driver.collection();
    let snapshot = shared.read().await;
    assert_eq!(&*snapshot.field("concerns_raised").unwrap(), "N/A");
    assert!(snapshot.is_done());
}

/// Scenario 5: conclude field, synthesized after master fields fill.
#[tokio::test]
async fn scenario_5_conclude_field_digest() {
    let update_tool = format!("update_{}", intake_collection().id());
    let conclude_tool = format!("conclude_{}", intake_collection().id());
    let config = DriverConfig::new().with_thread_id("scenario-5");
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(InMemoryCheckpointer::new());

    let llm = Arc::new(ScriptedChatModel::new(vec![Message::assistant("First question?")]));
    Driver::new(intake_collection(), config.clone(), llm)
        .unwrap()
        .with_checkpointer(checkpointer.clone())
        .go(None)
        .await
        .unwrap();

    let llm = Arc::new(ScriptedChatModel::new(vec![
        Message::assistant_with_tool_calls(
            "",
            vec![tool_call(
                "call_1",
                update_tool,
                serde_json::json!({
                    "q1": { "value": "answer one", "context": "", "as_quote": "" },
                    "q2": { "value": "answer two", "context": "", "as_quote": "" },
                }),
            )],
        ),
        Message::assistant_with_tool_calls(
            "",
            vec![tool_call(
                "call_2",
                conclude_tool,
                serde_json::json!({
                    "summary": { "value": "Covered both questions.", "context": "", "as_quote": "" }
                }),
            )],
        ),
        Message::assistant("All done, thank you!"),
    ]));
    let driver = Driver::new(intake_collection(), config, llm)
        .unwrap()
        .with_checkpointer(checkpointer);
    let reply = driver.go(Some("answer one, answer two")).await.unwrap();
    assert_eq!(reply, "All done, thank you!");

    let shared = driver.collection();
    let snapshot = shared.read().await;
    assert!(snapshot.field("summary").unwrap().value().is_some());
    assert!(snapshot.is_done());
}

/// Scenario 6: interrupt/resumption contract — calling `go()` twice
/// without ever responding must not duplicate the system prompt and
/// must yield the same assistant utterance both times.
#[tokio::test]
async fn scenario_6_repeated_go_without_resuming_is_idempotent() {
    let config = DriverConfig::new().with_thread_id("scenario-6");
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(InMemoryCheckpointer::new());
    let llm = Arc::new(ScriptedChatModel::new(vec![
        Message::assistant("Where to?"),
        Message::assistant("Where to?"),
    ]));

    let driver = Driver::new(trip_collection(), config, llm)
        .unwrap()
        .with_checkpointer(checkpointer);
    let first = driver.go(None).await.unwrap();
    let second = driver.go(None).await.unwrap();
    assert_eq!(first, second);
}

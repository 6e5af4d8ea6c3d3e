//! Retry-loop termination properties.
//!
//! For any number of consecutive blocking validations, the workflow
//! terminates within the retry budget: the generator runs exactly
//! `min(failures, max_retries) + 1` times and the recorded retry count
//! never exceeds the budget.

use menuforge::{
    Collaborators, Config, InMemoryStore, MenuDocument, Orchestrator, PlainTextExtractor,
    ScriptedClient, WorkflowError,
};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn menu_reply() -> String {
    json!({
        "restaurant_name": "Trattoria",
        "categories": [{"name": "Mains", "items": [{"name": "Lasagna", "price": 14.50}]}]
    })
    .to_string()
}

fn design_reply() -> String {
    json!({
        "design_system": {
            "primary_color": "#8b0000",
            "secondary_color": "#f5e6c8",
            "accent_color": "#c9a227",
            "background_color": "#fffaf0",
            "text_color": "#2b2b2b"
        },
        "typography": {"heading_font": "Georgia", "body_font": "Arial"}
    })
    .to_string()
}

fn site_reply(declare_route: bool) -> String {
    let routes = if declare_route {
        "<Routes><Route path='/' /><Route path='/mains' /></Routes>"
    } else {
        "<Routes><Route path='/' /></Routes>"
    };
    json!({
        "files": [
            {"path": "src/index.js", "content": "import App from './App';\nApp();"},
            {"path": "src/App.jsx", "content": format!("export default () => ({routes});")}
        ],
        "entry_point": "src/index.js"
    })
    .to_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn generator_invocations_are_bounded_by_the_budget(
        failures in 0u32..=6,
        max_retries in 0u32..=4,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let client = Arc::new(ScriptedClient::new());
        client.push_reply(menu_reply());
        client.push_reply(design_reply());
        for _ in 0..failures {
            client.push_reply(site_reply(false));
        }
        client.push_reply(site_reply(true));

        let store = Arc::new(InMemoryStore::new());
        let mut config = Config::default();
        config.workflow.max_retries = max_retries;
        let orchestrator = Orchestrator::new(
            config,
            Collaborators {
                extractor: Arc::new(PlainTextExtractor),
                llm: client.clone(),
                store: store.clone(),
            },
        );

        let document = MenuDocument::new("menu.txt", b"MAINS\nLasagna 14.50".to_vec());
        let result = runtime.block_on(orchestrator.run(document));

        let expected_calls = failures.min(max_retries) + 1;
        let generator_calls = (client.call_count() - 2) as u32;
        prop_assert_eq!(generator_calls, expected_calls);

        match result {
            Ok(outcome) => {
                prop_assert!(failures <= max_retries);
                prop_assert!(outcome.state.retry_count() <= max_retries);
                prop_assert_eq!(outcome.state.retry_count(), failures);
            }
            Err(WorkflowError::ValidationExhausted { attempts, report }) => {
                prop_assert!(failures > max_retries);
                prop_assert_eq!(attempts, max_retries + 1);
                prop_assert!(report.blocking_count() >= 1);
            }
            Err(other) => return Err(TestCaseError::fail(format!("unexpected error: {other}"))),
        }
    }
}

mod harness;

use harness::{attributes, classify, fault, severity, ScriptedInference};
use skywatch_analyzer::TweetAnalyzer;
use skywatch_common::{RetryPolicy, SocialPost, NONE_SENTINEL};

fn post(id: &str, text: &str) -> SocialPost {
    SocialPost {
        id: id.to_string(),
        timestamp: "2024-03-01T12:00:00Z".to_string(),
        text: text.to_string(),
        hashtags: String::new(),
    }
}

fn analyzer(inference: ScriptedInference) -> TweetAnalyzer<ScriptedInference> {
    TweetAnalyzer::new(inference).with_retry(RetryPolicy::immediate(3))
}

#[tokio::test]
async fn symbolic_flood_post_short_circuits_after_stage_one() {
    let text = "Blue heart yellow heart please help flood social media with this message";
    let inference = ScriptedInference::new().on(text, vec![classify(false)]);
    let calls = inference.counter();

    let record = analyzer(inference).analyze(&post("t1", text)).await;

    let record = record.unwrap();
    assert!(!record.is_genuine_disaster);
    assert_eq!(record.disaster_type, NONE_SENTINEL);
    assert_eq!(record.location, NONE_SENTINEL);
    assert_eq!(record.severity_score, None);
    assert_eq!(record.latitude, None);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn genuine_disaster_runs_all_three_stages() {
    let text = "Flood waters rising fast in Valencia, emergency crews deployed";
    let inference = ScriptedInference::new().on(
        text,
        vec![
            classify(true),
            attributes("Flood", "Valencia, Spain"),
            severity(3, 5, 8, 10),
        ],
    );
    let calls = inference.counter();

    let record = analyzer(inference).analyze(&post("t2", text)).await.unwrap();

    assert!(record.is_genuine_disaster);
    assert_eq!(record.disaster_type, "Flood");
    assert_eq!(record.location, "Valencia, Spain");
    // (3 + 5 + 8 + 10) / 40 * 10
    assert_eq!(record.severity_score, Some(6.5));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unspecified_disaster_type_skips_severity_stage() {
    let text = "Something terrible happened out there, please send help";
    let inference = ScriptedInference::new().on(
        text,
        vec![classify(true), attributes("Not Specified", "Valencia, Spain")],
    );
    let calls = inference.counter();

    let record = analyzer(inference).analyze(&post("t3", text)).await.unwrap();

    assert!(record.is_genuine_disaster);
    assert_eq!(record.disaster_type, "Not Specified");
    assert_eq!(record.location, "Valencia, Spain");
    assert_eq!(record.severity_score, None);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn transient_faults_within_budget_still_succeed() {
    let text = "Wildfire spreading through the hills above town";
    let inference =
        ScriptedInference::new().on(text, vec![fault(), fault(), classify(false)]);
    let calls = inference.counter();

    let record = analyzer(inference).analyze(&post("t4", text)).await;

    assert!(record.is_some_and(|r| !r.is_genuine_disaster));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[tokio::test]
async fn classification_exhaustion_drops_the_post() {
    let text = "Earthquake felt across the region this morning";
    let inference = ScriptedInference::new().on(text, vec![fault(), fault(), fault()]);
    let calls = inference.counter();

    let record = analyzer(inference).analyze(&post("t5", text)).await;

    assert!(record.is_none());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[tokio::test]
async fn attribute_exhaustion_drops_the_post() {
    let text = "Major landslide blocks the highway north of the city";
    let inference = ScriptedInference::new()
        .on(text, vec![classify(true), fault(), fault(), fault()]);
    let calls = inference.counter();

    let record = analyzer(inference).analyze(&post("t6", text)).await;

    assert!(record.is_none());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);
}

#[tokio::test]
async fn severity_exhaustion_falls_back_to_neutral() {
    let text = "Cyclone makes landfall near the coast, damage reports coming in";
    let inference = ScriptedInference::new().on(
        text,
        vec![
            classify(true),
            attributes("Cyclone", "Coastal Bangladesh"),
            fault(),
            fault(),
            fault(),
        ],
    );
    let calls = inference.counter();

    let record = analyzer(inference).analyze(&post("t7", text)).await.unwrap();

    assert!(record.is_genuine_disaster);
    assert_eq!(record.disaster_type, "Cyclone");
    // Neutral fallback: every sub-score is 5, composite is 5.0.
    assert_eq!(record.severity_score, Some(5.0));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 5);
}

#[tokio::test]
async fn out_of_range_severity_reply_is_retried() {
    let text = "Tornado touches down outside Moore, Oklahoma";
    let inference = ScriptedInference::new().on(
        text,
        vec![
            classify(true),
            attributes("Tornado", "Moore, Oklahoma"),
            severity(12, 0, 0, 0),
            severity(2, 2, 2, 2),
        ],
    );
    let calls = inference.counter();

    let record = analyzer(inference).analyze(&post("t8", text)).await.unwrap();

    // The out-of-range first reply is discarded; the retry's scores land.
    assert_eq!(record.severity_score, Some(2.0));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);
}

#[tokio::test]
async fn hashtags_reach_the_classifier_prompt() {
    let text = "Water everywhere downtown";
    let post = SocialPost {
        id: "t9".to_string(),
        timestamp: "2024-03-01T12:00:00Z".to_string(),
        text: text.to_string(),
        hashtags: "#flood #rescue".to_string(),
    };
    // The rule matches on the hashtag, which only appears in the combined
    // classifier text.
    let inference = ScriptedInference::new().on("#flood", vec![classify(false)]);

    let record = analyzer(inference).analyze(&post).await;

    assert!(record.is_some_and(|r| !r.is_genuine_disaster));
}

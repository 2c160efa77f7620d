mod common;

use std::time::Duration;

use babyface::{
    models::{AnnotatedImage, FixedAge},
    orchestrator::{MISSING_AGE_SELECTION, MISSING_REQUIRED_PHOTOS},
    BabyFaceError, BlendConfiguration, GenerationMode, GenerationRun, ImagePayload, RawResponse,
    RunEvent, SubjectImages,
};
use common::{
    image_response, orchestrator, profile, run, separate_subjects, text_response,
    ScriptedTransport,
};
use futures::StreamExt;

fn progression(ages: &[&str], per_age: u8) -> GenerationMode {
    GenerationMode::age_progression(ages.iter().map(|age| age.to_string()).collect(), per_age)
}

#[tokio::test(start_paused = true)]
async fn fixed_age_run_spaces_calls_and_publishes_once() {
    let transport = ScriptedTransport::new(vec![image_response(&[1]), image_response(&[2])]);
    let generation = GenerationRun::new(
        separate_subjects(),
        profile(BlendConfiguration::simple(70)),
        GenerationMode::fixed_age(FixedAge::default(), 2),
    );

    let mut publications: Vec<Vec<ImagePayload>> = Vec::new();
    let images = orchestrator(transport.clone())
        .run(&generation, |images| publications.push(images.to_vec()))
        .await
        .unwrap();

    let data: Vec<Vec<u8>> = images.iter().map(|image| image.data.clone()).collect();
    assert_eq!(data, vec![vec![1], vec![2]]);
    assert_eq!(publications, vec![images.clone()]);

    let times = transport.call_times();
    assert_eq!(times.len(), 2);
    assert_eq!(times[1].duration_since(times[0]), Duration::from_secs(4));

    for instruction in transport.instructions() {
        assert!(instruction.contains("- **Age:** Newborn\n"));
        assert!(instruction.contains("**70% to the mother** and **30% to the father**"));
    }
}

#[tokio::test(start_paused = true)]
async fn progression_publishes_the_accumulated_images_after_each_age() {
    let transport = ScriptedTransport::new(vec![image_response(&[1]), image_response(&[2])]);
    let generation = run(
        separate_subjects(),
        progression(&["1 year old", "2 years old"], 1),
    );

    let mut sizes = Vec::new();
    let images = orchestrator(transport.clone())
        .run(&generation, |images| sizes.push(images.len()))
        .await
        .unwrap();

    assert_eq!(sizes, vec![1, 2]);
    assert_eq!(images.len(), 2);

    let instructions = transport.instructions();
    assert!(instructions[0].contains("- **Age:** 1 year old\n"));
    assert!(instructions[1].contains("- **Age:** 2 years old\n"));

    // The delay only separates calls within one age.
    let times = transport.call_times();
    assert!(times[1].duration_since(times[0]) < Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn failing_age_stops_the_run_and_keeps_earlier_publications() {
    let transport = ScriptedTransport::new(vec![
        image_response(&[1]),
        image_response(&[2]),
        RawResponse::new(500, r#"{"error":{"message":"Internal error"}}"#),
    ]);
    let generation = run(
        separate_subjects(),
        progression(&["3 months old", "6 months old", "1 year old"], 2),
    );

    let mut sizes = Vec::new();
    let err = orchestrator(transport.clone())
        .run(&generation, |images| sizes.push(images.len()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BabyFaceError::ServiceError { status: 500, ref message } if message == "Internal error"
    ));
    assert_eq!(sizes, vec![2]);
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn first_age_failure_issues_no_call_for_later_ages() {
    let transport = ScriptedTransport::new(vec![text_response("I can't help with that.")]);
    let generation = run(
        separate_subjects(),
        progression(&["1 year old", "2 years old"], 1),
    );

    let mut published = 0;
    let err = orchestrator(transport.clone())
        .run(&generation, |_| published += 1)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "The model returned a text response instead of an image: I can't help with that."
    );
    assert_eq!(published, 0);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn quota_failure_aborts_the_batch() {
    let transport = ScriptedTransport::new(vec![
        image_response(&[1]),
        RawResponse::new(429, r#"{"error":{"message":"Resource has been exhausted"}}"#),
    ]);
    let generation = run(
        separate_subjects(),
        GenerationMode::fixed_age(FixedAge::Custom(4), 4),
    );

    let mut published = 0;
    let err = orchestrator(transport.clone())
        .run(&generation, |_| published += 1)
        .await
        .unwrap_err();

    assert!(err.is_quota());
    assert!(err.to_string().contains("API quota exceeded"));
    assert_eq!(published, 0);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn quota_failure_skips_the_remaining_ages() {
    let transport = ScriptedTransport::new(vec![RawResponse::new(
        429,
        r#"{"error":{"message":"Resource has been exhausted"}}"#,
    )]);
    let generation = run(
        separate_subjects(),
        progression(&["1 year old", "2 years old", "3 years old"], 2),
    );

    let mut published = 0;
    let err = orchestrator(transport.clone())
        .run(&generation, |_| published += 1)
        .await
        .unwrap_err();

    assert!(err.is_quota());
    assert_eq!(published, 0);
    assert_eq!(transport.call_count(), 1);
    assert!(transport.instructions()[0].contains("- **Age:** 1 year old\n"));
}

#[tokio::test(start_paused = true)]
async fn counts_outside_the_legal_range_are_clamped() {
    let transport = ScriptedTransport::new(vec![image_response(&[1])]);
    let zero = run(
        separate_subjects(),
        GenerationMode::FixedAge {
            age: FixedAge::default(),
            images: 0,
        },
    );
    let images = orchestrator(transport.clone())
        .run(&zero, |_| {})
        .await
        .unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(transport.call_count(), 1);

    let transport = ScriptedTransport::new((0..4).map(|i| image_response(&[i])).collect());
    let too_many = run(
        separate_subjects(),
        GenerationMode::AgeProgression {
            ages: vec!["1 year old".into(), "2 years old".into()],
            images_per_age: 9,
        },
    );
    let mut sizes = Vec::new();
    orchestrator(transport.clone())
        .run(&too_many, |images| sizes.push(images.len()))
        .await
        .unwrap();
    assert_eq!(sizes, vec![2, 4]);
    assert_eq!(transport.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn unmet_preconditions_issue_no_calls() {
    let transport = ScriptedTransport::new(Vec::new());
    let orchestrator = orchestrator(transport.clone());

    let no_ages = run(separate_subjects(), progression(&[], 1));
    let err = orchestrator.run(&no_ages, |_| {}).await.unwrap_err();
    assert!(err.is_input());
    assert_eq!(err.to_string(), MISSING_AGE_SELECTION);

    let no_mother = run(
        SubjectImages::Separate {
            father: vec![AnnotatedImage::single(
                "f1",
                ImagePayload::new("image/png", vec![1]),
                None,
            )],
            mother: Vec::new(),
        },
        GenerationMode::fixed_age(FixedAge::default(), 1),
    );
    let err = orchestrator.run(&no_mother, |_| {}).await.unwrap_err();
    assert_eq!(err.to_string(), MISSING_REQUIRED_PHOTOS);

    let empty_together = run(
        SubjectImages::Together(Vec::new()),
        GenerationMode::fixed_age(FixedAge::default(), 1),
    );
    assert!(orchestrator
        .run(&empty_together, |_| {})
        .await
        .unwrap_err()
        .is_input());

    assert_eq!(transport.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn together_photos_are_captioned_with_both_ages() {
    let transport = ScriptedTransport::new(vec![image_response(&[9])]);
    let generation = run(
        SubjectImages::Together(vec![AnnotatedImage::pair(
            "t1",
            ImagePayload::new("image/jpeg", vec![1, 2, 3]),
            Some("32"),
            Some("29"),
        )]),
        GenerationMode::fixed_age(FixedAge::default(), 1),
    );

    orchestrator(transport.clone())
        .run(&generation, |_| {})
        .await
        .unwrap();

    let texts = transport.texts(0);
    assert_eq!(texts.len(), 2);
    assert_eq!(
        texts[0],
        "This photo contains both the father and mother, taken when the father was around age 32 and the mother was around age 29."
    );
    assert!(texts[1].starts_with("Analyze the provided photos"));
}

#[tokio::test(start_paused = true)]
async fn run_stream_reports_publications_then_the_outcome() {
    let transport = ScriptedTransport::new(vec![
        image_response(&[1]),
        image_response(&[2]),
        image_response(&[3]),
        RawResponse::new(200, r#"{"candidates":[]}"#),
    ]);
    let generation = run(
        separate_subjects(),
        progression(&["1 year old", "2 years old"], 2),
    );

    let events: Vec<RunEvent> = orchestrator(transport)
        .run_stream(generation)
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], RunEvent::Published(images) if images.len() == 2));
    assert!(matches!(&events[1], RunEvent::Failed(BabyFaceError::NoImageProduced)));
}

#[tokio::test(start_paused = true)]
async fn run_stream_finishes_with_every_image() {
    let transport = ScriptedTransport::new(vec![image_response(&[1])]);
    let generation = run(
        separate_subjects(),
        GenerationMode::fixed_age(FixedAge::Preset("2 years old".into()), 1),
    );

    let mut stream = orchestrator(transport).run_stream(generation);
    assert!(matches!(stream.next().await, Some(RunEvent::Published(ref images)) if images.len() == 1));
    assert!(matches!(stream.next().await, Some(RunEvent::Finished(ref images)) if images[0].data == vec![1]));
    assert!(stream.next().await.is_none());
}

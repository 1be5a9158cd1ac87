use apush::llm::ShortAnswer;
use apush::llm::response::{completion_text, parse_completion};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const COMPLETION: &str = "```json\n{\n    \"question\": \"Which policy most directly led to the Trail of Tears?\",\n    \"options\": [\"Indian Removal Act\", \"Dawes Act\", \"Homestead Act\", \"Northwest Ordinance\"],\n    \"correct\": 0,\n    \"feedback\": \"The Indian Removal Act of 1830 authorized forced relocation.\"\n}\n```";

fn bench_response_pipeline(c: &mut Criterion) {
    let envelope = serde_json::to_vec(&serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": COMPLETION}]}}]
    }))
    .expect("failed to encode envelope");

    c.bench_function("parse_short_answer_completion", |b| {
        b.iter(|| {
            let text = completion_text(black_box(&envelope)).expect("missing completion");
            let question: ShortAnswer = parse_completion(&text).expect("invalid completion");
            black_box(question);
        });
    });
}

criterion_group!(benches, bench_response_pipeline);
criterion_main!(benches);

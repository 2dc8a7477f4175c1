use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
    "▁▁▁▁▁",
];

const TEMPLATE: &str = "{spinner:.blue} {msg} {pos}/{len} [{elapsed_precise}] {per_sec}";

/// A span whose progress bar tracks completed probes. The bar is drawn while
/// the span is entered and disappears once every clone of it is dropped.
pub fn progress_span(total: usize) -> Span {
    let span = info_span!("scan", indicatif.pb_show = true);
    span.pb_set_style(&style());
    span.pb_set_length(total as u64);
    span.pb_set_message("probing");
    span
}

fn style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .map(|style| style.tick_strings(TICKS))
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

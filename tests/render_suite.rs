use std::path::Path;

use chart_rs_renderer::layout::{ShapeDescriptor, compute_layout};
use chart_rs_renderer::{
    ChartSpec, Config, PipelineState, RenderOptions, RenderPipeline, SceneSurface, render_spec,
};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn load_fixture(name: &str) -> ChartSpec {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    ChartSpec::from_json(&input).expect("fixture should parse")
}

fn render_fixture(name: &str, animated: bool) -> String {
    let spec = load_fixture(name);
    render_spec(&spec, &RenderOptions::modern().with_animation(animated))
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = [
        ("bar/basic.json", "bar"),
        ("bar/grouped.json5", "bar"),
        ("bar/negative.json", "bar"),
        ("line/basic.json", "line"),
        ("line/multi.json5", "line"),
        ("pie/basic.json", "pie"),
        ("pie/small_slices.json", "pie"),
        ("donut/basic.json5", "donut"),
        ("empty/no_values.json", "bar"),
        ("empty/zero_total.json", "donut"),
    ];
    for (fixture, kind) in fixtures {
        for animated in [true, false] {
            let svg = render_fixture(fixture, animated);
            assert_valid_svg(&svg, fixture);
            assert!(
                svg.contains(&format!("data-chart=\"{kind}\"")),
                "{fixture}: wrong chart kind"
            );
        }
    }
}

#[test]
fn bar_fixture_has_one_tooltip_per_bar() {
    let svg = render_fixture("bar/basic.json", true);
    assert!(svg.contains("Monthly sign-ups"));
    assert_eq!(svg.matches("<title>").count(), 5);
    assert!(svg.contains("<title>May: 170</title>"));
    assert!(svg.contains("<animate"));
}

#[test]
fn grouped_bars_use_value_affixes() {
    let svg = render_fixture("bar/grouped.json5", true);
    assert!(svg.contains("<title>South: $14k</title>"));
    assert!(svg.contains("dur=\"600ms\""));
}

#[test]
fn negative_bar_collapses_to_the_baseline() {
    let config = Config::default();
    let layout = compute_layout(
        &load_fixture("bar/negative.json"),
        &config.theme,
        &config.layout,
    );
    let bars: Vec<_> = layout.shapes().iter().filter_map(|s| s.as_bar()).collect();
    assert_eq!(bars.len(), 3);
    assert_eq!(bars[1].height, 0.0);
    assert!(bars[0].height > 0.0 && bars[2].height > bars[0].height);
    assert!(layout.geometry().unwrap().legend.is_empty());
}

#[test]
fn multi_line_markers_name_their_series() {
    let svg = render_fixture("line/multi.json5", true);
    assert!(svg.contains("<title>p99 · 12:00: 71 ms</title>"));
    assert!(svg.contains("#1f77b4"));
    assert!(svg.contains("Latency"));
}

#[test]
fn pie_fixture_labels_shares() {
    let svg = render_fixture("pie/basic.json", true);
    assert!(svg.contains("<title>Rent: 1200 (60.0%)</title>"));
    assert!(svg.contains(">60.0%</text>"));
    assert!(svg.contains(">Savings</text>"));
}

#[test]
fn small_slices_skip_their_labels() {
    let config = Config::default();
    let spec = load_fixture("pie/small_slices.json");
    let layout = compute_layout(&spec, &config.theme, &config.layout);
    let arcs: Vec<_> = layout.shapes().iter().filter_map(|s| s.as_arc()).collect();
    assert_eq!(arcs.len(), 3);
    assert_eq!(arcs[0].text.as_deref(), Some("96.0%"));
    assert!(arcs[1].text.is_none());
    assert!(arcs[2].text.is_none());
    // Zero-valued categories still get a legend entry.
    let legend = &layout.geometry().unwrap().legend;
    assert!(legend.iter().any(|item| item.label == "d"));
}

#[test]
fn empty_fixtures_render_the_placeholder() {
    for fixture in ["empty/no_values.json", "empty/zero_total.json"] {
        let svg = render_fixture(fixture, true);
        assert!(svg.contains("No data to display"), "{fixture}");
        assert!(!svg.contains("<animate"), "{fixture}");
        assert!(!svg.contains("<title>"), "{fixture}");
    }
}

#[test]
fn pipeline_hover_lifecycle_on_a_donut() {
    let spec = load_fixture("donut/basic.json5");
    let mut pipeline = RenderPipeline::new(SceneSurface::new(), Config::default());
    pipeline.render(&spec);
    assert_eq!(pipeline.state(), PipelineState::Rendered);

    pipeline.tick(2000.0);
    assert!(!pipeline.is_animating());

    let point = match &pipeline.layout().unwrap().shapes()[0] {
        ShapeDescriptor::ArcSlice(arc) => arc.text_position,
        other => panic!("expected an arc, got {other:?}"),
    };
    pipeline.pointer_move(point.0, point.1, 2100.0);
    assert!(pipeline.tooltip_state().visible);
    assert_eq!(pipeline.tooltip_state().content, "search: 55 (55.0%)");
    let hovered_svg = pipeline
        .surface()
        .to_svg(&pipeline.config().theme, pipeline.config());
    assert!(hovered_svg.contains("class=\"tooltip\""));

    pipeline.pointer_leave(2200.0);
    assert!(pipeline.tooltip_state().visible);
    pipeline.tick(2500.0);
    assert!(!pipeline.tooltip_state().visible);
    assert_eq!(pipeline.surface().overlay_count(), 1);

    pipeline.render(&load_fixture("pie/basic.json"));
    assert_eq!(pipeline.surface().overlay_count(), 0);

    pipeline.dispose();
    pipeline.dispose();
    assert_eq!(pipeline.state(), PipelineState::Disposed);
}

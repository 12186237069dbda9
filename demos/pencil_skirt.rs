//! Builds a two-panel fitted skirt with waist darts and a waistband, and
//! prints the assembled pattern as JSON.
//!
//! Usage:
//! ```text
//! cargo run --example pencil_skirt
//! RUST_LOG=sewkit=debug cargo run --example pencil_skirt
//! ```

use sewkit::config::{AssemblyOptions, DesignParams};
use sewkit::geometry::{Edge, EdgeSequence};
use sewkit::math::{Point2, Vector3};
use sewkit::operations::creation::{CurveFromExtreme, DartShape};
use sewkit::operations::modification::CutIntoEdge;
use sewkit::pattern::{Component, Interface, Panel, PanelId, PatternStore};
use sewkit::PatternError;

const DESIGN: &str = r#"{
    "waist": 70.0,
    "hips": 98.0,
    "length": 50.0,
    "hip_depth": 20.0,
    "dart_depth": 12.0,
    "hem_ratio": 0.9,
    "band_width": 4.0
}"#;

fn skirt_panel(store: &mut PatternStore, name: &str, params: &DesignParams) -> Result<PanelId, PatternError> {
    let half = params.number("hips")? / 4.0;
    let waist = params.number("waist")? / 2.0;
    let length = params.number("length")?;
    let top_y = length + params.number_or("hip_depth", 20.0)?;
    let low = half * params.number_or("hem_ratio", 0.9)?;

    let w_diff = 2.0 * half - waist;
    let shift = w_diff / 6.0;

    let right = CurveFromExtreme::new(
        Point2::new(half - low, 0.0),
        Point2::new(shift, top_y),
        Point2::new(0.0, length),
    )
    .execute();
    let top = Edge::line(right.end, Point2::new(2.0 * half - shift, top_y));
    let left = CurveFromExtreme::new(top.end, Point2::new(half + low, 0.0), Point2::new(2.0 * half, length)).execute();
    let mut edges = EdgeSequence::from_edges([right.clone(), top.clone(), left.clone()])?.closed();

    let dart = DartShape::new(w_diff - 2.0 * shift, params.number("dart_depth")?).execute()?;
    let cut = CutIntoEdge::new(dart, top.clone(), top.length() / 2.0, true).execute()?;
    edges.substitute(&top, cut.boundary)?;

    let id = store.add_panel(Panel::new(name, edges));
    let panel = store.panel_mut(id)?;
    let folds = panel.keys_of(&cut.inserted)?;
    let (right, left) = (panel.keys_of([&right])?, panel.keys_of([&left])?);
    let top = panel.keys_of(&cut.open)?;
    panel.stitches_mut().connect(
        Interface::from_edge(id, folds[0]),
        Interface::from_edge(id, folds[1]).reversed(),
    );
    panel
        .set_interface("right", Interface::new(id, right))
        .set_interface("left", Interface::new(id, left))
        .set_interface("top", Interface::new(id, top))
        .top_center_pivot();
    Ok(id)
}

fn waistband(store: &mut PatternStore, length: f64, width: f64) -> Result<PanelId, PatternError> {
    let edges = EdgeSequence::from_verts(&[
        Point2::new(0.0, 0.0),
        Point2::new(0.0, width),
        Point2::new(length, width),
        Point2::new(length, 0.0),
    ])
    .closed();
    let id = store.add_panel(Panel::new("waistband", edges));
    let panel = store.panel_mut(id)?;
    let bottom = panel.key_at(3)?;
    panel
        .set_interface("bottom", Interface::from_edge(id, bottom))
        .top_center_pivot();
    Ok(id)
}

fn main() -> Result<(), PatternError> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("sewkit=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let params: DesignParams = serde_json::from_str(DESIGN)?;
    let mut store = PatternStore::new();

    let front = skirt_panel(&mut store, "skirt_front", &params)?;
    store.panel_mut(front)?.translate_to(Vector3::new(0.0, 100.0, 15.0));
    let back = store.duplicate_panel(front, "skirt_back")?;
    store
        .panel_mut(back)?
        .translate_to(Vector3::new(0.0, 100.0, -15.0))
        .swap_right_wrong();

    let mut skirt = Component::new("pencil_skirt");
    skirt
        .add_panel(front)
        .add_panel(back)
        .connect(store.interface(front, "right")?, store.interface(back, "right")?)
        .connect(store.interface(front, "left")?, store.interface(back, "left")?)
        .set_interface(
            "waist",
            Interface::from_multiple([store.interface(front, "top")?, store.interface(back, "top")?]),
        );

    let waist = skirt.interface("waist")?.clone();
    let waist_length = waist.length(&store)?;
    let band = waistband(&mut store, waist_length, params.number_or("band_width", 4.0)?)?;
    store.panel_mut(band)?.translate_to(Vector3::new(0.0, 110.0, 20.0));

    let mut outfit = Component::new("pencil_skirt_with_band");
    outfit.add_component(skirt).add_panel(band);
    let band_bottom = store.interface(band, "bottom")?;
    outfit.connect_matching(&mut store, waist, band_bottom)?;

    let doc = outfit.assembly_with(&store, &AssemblyOptions::default())?;
    println!("{}", doc.to_json_pretty()?);
    Ok(())
}

//! Drives the controller against the in-memory renderer: a base map, a
//! labelled district layer, a hover and a click.

use mapgl::prelude::*;
use serde_json::{json, Map as JsonMap};

fn district(name: &str, color: &str, west: f64, south: f64) -> Feature {
    let mut properties = JsonMap::new();
    properties.insert("name".to_string(), json!(name));
    properties.insert("color".to_string(), json!(color));
    Feature::new(
        Geometry::Polygon {
            coordinates: vec![vec![
                [west, south],
                [west + 1.0, south],
                [west + 1.0, south + 1.0],
                [west, south + 1.0],
                [west, south],
            ]],
        },
        properties,
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut map = Map::new(HeadlessRenderer::new(), MapOptions::new("map"));

    map.add_layer(Box::new(TileLayer::from_url(
        "osm",
        "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
    )?))
    .await?;

    let districts = ThematicLayer::new(
        LayerOptions::new()
            .with_id("districts")
            .with_index(1)
            .with_data(vec![
                district("Bo", "#fc8d59", -12.0, 7.5),
                district("Kenema", "#91cf60", -11.2, 7.8),
            ])
            .with_label(LabelStyle::default())
            .on_click(|event| {
                if let Some(feature) = event.feature() {
                    println!("Clicked feature {:?} at {:?}", feature.id, event.lat_lng());
                }
            }),
    )?;
    let bounds = districts.base().bounds();
    map.add_layer(Box::new(districts)).await?;

    println!("Queued before style load: {}", map.pending_layer_count());

    map.renderer_mut().finish_style_load();
    map.handle_event(RendererEvent::StyleLoad).await?;
    map.settle().await?;

    if let Some(bounds) = bounds {
        map.fit_bounds(&bounds);
    }
    println!("Paint order: {:?}", map.renderer().style_ids());

    map.renderer_mut().place_feature(
        Point::new(120.0, 80.0),
        RenderedFeature {
            id: Some(0),
            source: "districts".to_string(),
            layer_id: "districts".to_string(),
            geometry: None,
            properties: Default::default(),
        },
    );

    let lat_lng = LatLng::new(8.0, -11.5);
    let point = Point::new(120.0, 80.0);
    map.handle_event(RendererEvent::MouseMove { lat_lng, point })
        .await?;
    println!(
        "Hovered: {:?}, cursor: {:?}",
        map.renderer().hovered(),
        map.renderer().cursor()
    );

    map.handle_event(RendererEvent::Click { lat_lng, point }).await?;

    map.set_layer_opacity("districts", 0.6)?;
    if let Some(removed) = map.remove_layer("osm") {
        println!("Removed layer {}", removed.id());
    }

    Ok(())
}

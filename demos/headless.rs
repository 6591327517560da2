use anyhow::Context;
use maputil::prelude::*;

/// Example of driving maputil without any renderer: markers move against a
/// virtual clock pumped by a simulated 60 fps frame loop
fn main() -> anyhow::Result<()> {
    maputil::init_logging();

    println!("maputil headless example");
    println!("========================");

    let clock = ManualClock::new();
    let scheduler = Arc::new(ManualScheduler::new(clock.clone()));

    let mut rasterizer = IconRasterizer::new(MarkerLayout::default());
    // 16x16 opaque blue arrow stand-in
    rasterizer.register_rgba(IconResource(1), 16, 16, [30, 90, 200, 255].repeat(16 * 16))?;

    let toolkit = MapToolkitBuilder::new()
        .with_profile(AnimationProfile::Standard)
        .with_icons(IconConfig {
            navigation_icon: Some(IconResource(1)),
            ..IconConfig::default()
        })
        .with_clock(Arc::new(clock.clone()))
        .with_scheduler(scheduler.clone())
        .with_rasterizer(Arc::new(rasterizer))
        .build()
        .context("building the toolkit")?;

    let map = ViewportMap::new(
        LatLng::new(37.7749, -122.4194),
        13.0,
        Point::new(1080.0, 1920.0),
    );

    // Add a few markers
    let stops = [
        ("Ferry Building", LatLng::new(37.7955, -122.3937)),
        ("Coit Tower", LatLng::new(37.8024, -122.4058)),
        ("Dolores Park", LatLng::new(37.7596, -122.4269)),
    ];
    let mut markers = Vec::new();
    for (name, location) in stops {
        let options = toolkit.marker_options(&MapMarker::new(location).with_title(name), false)?;
        markers.push(map.add_marker(&options));
        println!("   marker {:<15} {:.4}, {:.4}", name, location.lat, location.lng);
    }

    let driver = MapMarker::new(LatLng::new(37.7793, -122.4193)).with_title("Driver");
    let driver_options = toolkit.navigation_marker_options(&driver, false)?;
    let driver = map.add_marker(&driver_options);
    markers.push(driver.clone());

    let bounds = toolkit.fit_markers(&map, &markers, None)?;
    let viewport = map.viewport();
    println!(
        "\nFramed {} markers: SW {:.4}, {:.4} NE {:.4}, {:.4} at zoom {}",
        markers.len(),
        bounds.south_west.lat,
        bounds.south_west.lng,
        bounds.north_east.lat,
        bounds.north_east.lng,
        viewport.zoom
    );

    // Drive to each stop, following with the camera
    for (name, location) in stops {
        let leg_meters = driver.position().distance_to(&location);
        let handle = toolkit.move_and_animate(&map, &driver, location, 16.0, 45.0)?;
        let mut frames = 0;
        while handle.is_running() {
            clock.advance(Duration::from_millis(16));
            scheduler.run_due();
            frames += 1;
        }
        let position = driver.position();
        println!(
            "   driver at {:<15} {:.4}, {:.4} after {} frames ({:.0} m)",
            name, position.lat, position.lng, frames, leg_meters
        );
    }

    // Start one more move and interrupt it
    let handle = toolkit.animate_marker(&map, &driver, LatLng::new(37.7694, -122.4862))?;
    scheduler.advance(Duration::from_millis(400));
    toolkit.remove_marker(driver.as_ref());
    scheduler.run_until_idle(1000);
    println!(
        "\nDriver removed mid-move ({:?}), {} markers left",
        handle.state(),
        map.markers().len()
    );

    println!("\nOptions in use:\n{}", toolkit.options().to_json_string()?);
    Ok(())
}

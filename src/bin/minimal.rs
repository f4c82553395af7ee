// Minimal run of the engine without hardware or server

use legacy_lights::{
    animation::{Engine, Mode},
    color::ColorSpaceRegistry,
    config::Config,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("💡 Testing Legacy Lights Core Functionality");

    // Test 1: Color spaces
    println!("\n1. Testing Color Space Registry...");
    let registry = ColorSpaceRegistry::new();
    let available = registry.available_spaces();
    println!("   Available spaces: {:?}", available);
    assert_eq!(available.len(), 6);

    // Test 2: Engine
    println!("\n2. Creating Engine...");
    let config = Config::default();
    let mut engine = Engine::from_config(&config);
    println!("   Pixels: {}", engine.pixel_count());
    println!("   Controls: {}", config.controls.len());

    // Test 3: Record a rolling rainbow
    println!("\n3. Recording a rolling rainbow...");
    engine.apply_discrete("logitech", "Record", true);
    engine.apply_discrete("down", "Rainbow", true);
    engine.tick();
    engine.apply_discrete("rb", "Copy", true);
    engine.apply_discrete("down", "Rainbow", false);
    engine.apply_continuous("rt", "RollR", 1.0);

    for _ in 0..engine.pixel_count() {
        engine.tick();
    }
    let status = engine.status();
    println!("   Buffered frames: {}", status.buffered_frames);
    println!("   Step: {:?} every {} ms", status.step, status.delay_ms);

    // Test 4: Save the recording
    println!("\n4. Saving recording...");
    match engine.save_recording("minimal_test_output.png") {
        Ok(()) => println!("   📁 Output saved to: minimal_test_output.png"),
        Err(e) => println!("   ⚠️  Could not save file: {}", e.user_message()),
    }

    // Test 5: Play it back
    println!("\n5. Playing back...");
    engine.apply_discrete("logitech", "Record", true);
    let frames = engine.playback().frames().to_vec();
    engine.play_recording(frames)?;
    let mut played = 0;
    while engine.mode() == Mode::Playing {
        engine.tick();
        played += 1;
    }
    println!("   Played {} frames, mode is now {:?}", played, engine.mode());

    println!("\n🎉 All checks passed! Legacy Lights core is working.");

    Ok(())
}

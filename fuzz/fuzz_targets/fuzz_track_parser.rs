#![no_main]

use libfuzzer_sys::fuzz_target;
use race_track_editor::{parse_track_json, BezierTrack};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(points) = parse_track_json(content) else {
        return;
    };

    // Gültiges Layout muss sich laden und verlustfrei speichern lassen
    let mut track = BezierTrack::new();
    let looped = points.len() % 3 == 0;
    if track.load_from_array(&points, looped).is_err() {
        return;
    }
    assert_eq!(track.save_as_array(), points);

    for index in 0..track.num_segments() {
        if let Some(curve) = track.segment_mut(index) {
            let length = curve.create_lut(20);
            let _ = curve.point_distance(length / 2.0);
        }
    }
});

use ndarray::{array, Array2};
use sorttrack::{Sort, SortConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut tracker = Sort::new(SortConfig::default().with_max_age(2))?;

    let frames: Vec<Array2<f32>> = vec![
        // Frame 1: three objects
        array![
            [10.0, 10.0, 50.0, 50.0, 0.9],
            [100.0, 100.0, 150.0, 150.0, 0.8],
            [200.0, 200.0, 240.0, 240.0, 0.7],
        ],
        // Frame 2: objects move slightly
        array![
            [12.0, 12.0, 52.0, 52.0, 0.9],
            [102.0, 98.0, 152.0, 148.0, 0.8],
            [205.0, 195.0, 245.0, 235.0, 0.7],
        ],
        // Frame 3: second object missed by the detector
        array![
            [14.0, 14.0, 54.0, 54.0, 0.9],
            [210.0, 190.0, 250.0, 230.0, 0.7],
        ],
        // Frame 4: second object is back, a new one appears
        array![
            [16.0, 16.0, 56.0, 56.0, 0.9],
            [106.0, 94.0, 156.0, 144.0, 0.8],
            [215.0, 185.0, 255.0, 225.0, 0.7],
            [300.0, 300.0, 340.0, 340.0, 0.8],
        ],
        // Frame 5: nothing detected
        Array2::zeros((0, 5)),
    ];

    for (i, detections) in frames.iter().enumerate() {
        let tracks = tracker.update_array(detections.view())?;
        println!("Frame {}: {} reported tracks", i + 1, tracks.nrows());
        for row in tracks.outer_iter() {
            println!(
                "  Track ID {}: [{:.1}, {:.1}, {:.1}, {:.1}]",
                row[4], row[0], row[1], row[2], row[3]
            );
        }
    }

    println!("\nLive tracks: {}", tracker.num_tracks());
    println!("Frames processed: {}", tracker.frame_count());

    Ok(())
}

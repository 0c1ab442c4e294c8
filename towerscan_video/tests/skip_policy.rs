// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenario 6: a 100-frame source with `skipFrames=5` produces
//! 20 frames at positions 0, 5, 10, …, 95; `skipMilliseconds` below one
//! frame duration behaves as no-skip.

use image::{ImageBuffer, Luma};
use towerscan_core::video::SkipPolicy;
use towerscan_video::source::ImageListSource;
use towerscan_video::VideoSource;

fn write_frames(dir: &std::path::Path, count: usize) -> Vec<std::path::PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("f{i:04}.png"));
            let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(2, 2, Luma([100]));
            img.save(&path).unwrap();
            path
        })
        .collect()
}

#[test]
fn skip_frames_five_yields_twenty_frames() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_frames(dir.path(), 100);
    let mut source = ImageListSource::open(paths, 30.0).unwrap();
    source.set_skip_policy(SkipPolicy::SkipFrames(5));

    let mut positions = Vec::new();
    while source.next_frame().unwrap().is_some() {
        positions.push(source.position().frame);
    }

    let expected: Vec<u64> = (0..100).step_by(5).collect();
    assert_eq!(positions, expected);
}

#[test]
fn skip_millis_under_one_frame_is_no_skip() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_frames(dir.path(), 12);
    let mut source = ImageListSource::open(paths, 30.0).unwrap(); // ~33.3ms/frame
    source.set_skip_policy(SkipPolicy::SkipMillis(5));

    let mut positions = Vec::new();
    while source.next_frame().unwrap().is_some() {
        positions.push(source.position().frame);
    }
    assert_eq!(positions, (0..12).collect::<Vec<_>>());
}

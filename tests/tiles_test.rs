mod common;

use common::{config, noise, solid_tiles};
use image::{ImageBuffer, Rgb, RgbImage};
use marching_contours::tiles::tile_path;
use marching_contours::{generate_default_tiles, process, process_image, ContourError, Params, TileLibrary};

#[test]
fn default_tiles_round_trip_through_directory() {
    let dir = tempfile::tempdir().unwrap();
    let tiles = generate_default_tiles(8, 8).unwrap();
    tiles.save(dir.path()).unwrap();
    for k in 0..16 {
        assert!(tile_path(dir.path(), k).exists(), "tile {} written", k);
    }

    let loaded = TileLibrary::load(dir.path()).expect("tiles load back");
    assert_eq!((loaded.tile_width(), loaded.tile_height()), (8, 8));
    for k in 0..16u8 {
        assert_eq!(loaded.tile(k), tiles.tile(k), "tile {}", k);
    }
}

#[test]
fn default_tiles_draw_only_where_contour_crosses() {
    let tiles = generate_default_tiles(8, 8).unwrap();
    let white = Rgb([255u8, 255, 255]);
    for k in [0u8, 15] {
        assert!(tiles.tile(k).pixels().all(|p| *p == white), "tile {} is blank", k);
    }
    for k in 1u8..15 {
        assert!(tiles.tile(k).pixels().any(|p| *p != white), "tile {} has a segment", k);
    }
    // Complementary configurations share their segment.
    assert_eq!(tiles.tile(1), tiles.tile(14));
    assert_eq!(tiles.tile(3), tiles.tile(12));
}

#[test]
fn missing_tile_is_an_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    generate_default_tiles(8, 8).unwrap().save(dir.path()).unwrap();
    std::fs::remove_file(tile_path(dir.path(), 9)).unwrap();
    match TileLibrary::load(dir.path()) {
        Err(ContourError::TileLoad { path, .. }) => assert_eq!(path, tile_path(dir.path(), 9)),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("load should fail with a missing tile"),
    }
}

#[test]
fn malformed_tile_is_an_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    generate_default_tiles(8, 8).unwrap().save(dir.path()).unwrap();
    std::fs::write(tile_path(dir.path(), 3), b"not an image").unwrap();
    assert!(matches!(TileLibrary::load(dir.path()), Err(ContourError::TileLoad { .. })));
}

#[test]
fn tiles_must_share_one_size() {
    let mut tiles: Vec<RgbImage> = (0..16).map(|_| ImageBuffer::new(8, 8)).collect();
    tiles[7] = ImageBuffer::new(8, 4);
    match TileLibrary::from_tiles(tiles) {
        Err(ContourError::TileSizeMismatch { index, found_h, .. }) => {
            assert_eq!(index, 7);
            assert_eq!(found_h, 4);
        }
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("mismatched tiles must be rejected"),
    }
}

#[test]
fn library_needs_sixteen_tiles() {
    let tiles: Vec<RgbImage> = (0..15).map(|_| ImageBuffer::new(8, 8)).collect();
    assert!(matches!(TileLibrary::from_tiles(tiles), Err(ContourError::TileCount(15))));
}

#[test]
fn process_writes_the_same_image_as_in_memory_run() {
    let dir = tempfile::tempdir().unwrap();
    let contours = dir.path().join("contours");
    let tiles = solid_tiles(8);
    tiles.save(&contours).unwrap();

    let input = dir.path().join("in.ppm");
    let output = dir.path().join("out.ppm");
    let img = noise(48, 40, 21);
    img.save(&input).unwrap();

    let mut cfg = config(8, 128, 3);
    cfg.contours_dir = contours;
    process(Params {
        in_image_name: input.to_string_lossy().into_owned(),
        out_image_name: output.to_string_lossy().into_owned(),
        config: cfg.clone(),
    })
    .expect("file run succeeds");

    let written = image::open(&output).unwrap().to_rgb8();
    let expected = process_image(&img, &tiles, &cfg).unwrap();
    assert_eq!(written, expected);
}

#[test]
fn process_fails_without_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.ppm");
    noise(16, 16, 1).save(&input).unwrap();
    let mut cfg = config(8, 128, 2);
    cfg.contours_dir = dir.path().join("nowhere");
    let out = dir.path().join("out.ppm");
    let res = process(Params {
        in_image_name: input.to_string_lossy().into_owned(),
        out_image_name: out.to_string_lossy().into_owned(),
        config: cfg,
    });
    assert!(res.is_err());
    assert!(!out.exists(), "no output on failure");
}

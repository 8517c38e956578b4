use super::*;
use crate::raw::encode;

fn star(x: f32, y: f32, z: f32) -> [f32; 8] {
	[x, y, z, 0.5, 0.5, 0.0, 0.0, 0.0]
}

fn grid_stars(per_axis: usize) -> Vec<f32> {
	let mut data = Vec::new();
	for i in 0..per_axis {
		for j in 0..per_axis {
			for k in 0..per_axis {
				let at = |n: usize| -9.0 + 18.0 * n as f32 / per_axis as f32;
				data.extend_from_slice(&star(at(i), at(j), at(k)));
			}
		}
	}
	data
}

fn options(dir: &Path, data: &[f32], max_stars: Option<u32>) -> BuildOptions {
	let input = dir.join("stars.raw");
	std::fs::write(&input, encode(8, data)).unwrap();
	BuildOptions {
		input,
		output: dir.join("stars.octree"),
		config: None,
		max_stars,
	}
}

#[test]
fn test_build_then_inspect() {
	let dir = tempfile::tempdir().unwrap();
	let opts = options(dir.path(), &grid_stars(10), Some(32));

	let report = build(&opts).unwrap();
	assert_eq!(report.inserted, 1000);
	assert_eq!(report.skipped, 0);
	assert!(report.stats.subdivisions > 0);

	let octree = inspect(&opts.output, None).unwrap();
	assert_eq!(octree.num_stars(), 1000);
	assert_eq!(octree.max_stars_per_node(), 32);
	assert_eq!(*octree.stats(), report.stats);
}

#[test]
fn test_build_skips_unseparable_stars() {
	let dir = tempfile::tempdir().unwrap();
	let mut data = Vec::new();
	for _ in 0..5 {
		data.extend_from_slice(&star(1.0, 1.0, 1.0));
	}
	data.extend_from_slice(&star(-1.0, -1.0, -1.0));
	let opts = options(dir.path(), &data, Some(4));

	let report = build(&opts).unwrap();
	assert_eq!(report.inserted, 5);
	assert_eq!(report.skipped, 1);
}

#[test]
fn test_build_with_config_file() {
	let dir = tempfile::tempdir().unwrap();
	let config = dir.path().join("octree.toml");
	std::fs::write(&config, "[octree]\nmax_stars_per_node = 16\n").unwrap();
	let mut opts = options(dir.path(), &grid_stars(4), None);
	opts.config = Some(config);

	build(&opts).unwrap();
	let octree = inspect(&opts.output, None).unwrap();
	assert_eq!(octree.max_stars_per_node(), 16);
	assert_eq!(octree.num_stars(), 64);
}

#[test]
fn test_build_rejects_layout_mismatch() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("narrow.raw");
	std::fs::write(&input, encode(5, &[0.0; 10])).unwrap();
	let opts = BuildOptions {
		input,
		output: dir.path().join("out.octree"),
		config: None,
		max_stars: None,
	};

	assert!(build(&opts).is_err());
	assert!(!opts.output.exists());
}

#[test]
fn test_build_rejects_implausible_width() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("huge.raw");
	std::fs::write(&input, encode(i32::MAX, &[0.0; 4])).unwrap();
	let opts = BuildOptions {
		input,
		output: dir.path().join("out.octree"),
		config: None,
		max_stars: None,
	};

	let err = build(&opts).unwrap_err();
	assert!(format!("{:#}", err).contains("layout expects 8"), "Got {:#}", err);
	assert!(!opts.output.exists());
}

#[test]
fn test_build_missing_input() {
	let dir = tempfile::tempdir().unwrap();
	let opts = BuildOptions {
		input: dir.path().join("absent.raw"),
		output: dir.path().join("out.octree"),
		config: None,
		max_stars: None,
	};
	assert!(build(&opts).is_err());
}

#[test]
fn test_inspect_rejects_other_layout() {
	let dir = tempfile::tempdir().unwrap();
	let opts = options(dir.path(), &grid_stars(2), None);
	build(&opts).unwrap();

	let config = dir.path().join("narrow.toml");
	std::fs::write(&config, "[layout]\nvel_size = 0\n").unwrap();
	assert!(inspect(&opts.output, Some(&config)).is_err());
}

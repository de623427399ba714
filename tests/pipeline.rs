// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/pipeline.rs - 文件输入到张量输出的端到端测试
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::io::Write;

use url::Url;

use shanan_nv21::{
  FromUrl, FrameConverter, Nv21Buffer,
  input::InputWrapper,
  output::OutputWrapper,
  task::{ContinuousTask, OneShotTask, Task},
};

fn scheme_url(scheme: &str, path: &std::path::Path, query: Option<&str>) -> Url {
  let mut url = Url::from_file_path(path).unwrap();
  url.set_query(query);
  Url::parse(&url.as_str().replacen("file:", &format!("{scheme}:"), 1)).unwrap()
}

fn read_f32(path: &std::path::Path) -> Vec<f32> {
  std::fs::read(path)
    .unwrap()
    .chunks_exact(4)
    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    .collect()
}

#[test]
fn raw_file_to_tensor_file() {
  let dir = tempfile::tempdir().unwrap();
  let source = dir.path().join("frames.yuv");
  let white = Nv21Buffer::uniform(8, 6, 235, 128, 128).unwrap();
  let mut file = std::fs::File::create(&source).unwrap();
  file.write_all(white.frame().unwrap().as_bytes()).unwrap();
  file.flush().unwrap();

  let input = InputWrapper::from_url(&scheme_url("nv21", &source, Some("width=8&height=6"))).unwrap();
  let target = dir.path().join("out").join("frame.f32");
  let output = OutputWrapper::from_url(&scheme_url("tensor", &target, None)).unwrap();
  let converter = FrameConverter::new(4, 4).unwrap();

  let summary = OneShotTask.run_task(input, &converter, output).unwrap();
  assert_eq!(summary.converted, 1);

  let values = read_f32(&target);
  assert_eq!(values.len(), 3 * 4 * 4);
  assert!(values.iter().all(|&v| v == 1.0));

  let meta: serde_json::Value =
    serde_json::from_slice(&std::fs::read(target.with_extension("json")).unwrap()).unwrap();
  assert_eq!(meta["shape"], serde_json::json!([1, 3, 4, 4]));
  assert_eq!(meta["layout"], "NCHW");
}

#[test]
fn paths_with_spaces_and_unicode() {
  let dir = tempfile::tempdir().unwrap();
  let folder = dir.path().join("相机 帧");
  std::fs::create_dir_all(&folder).unwrap();
  let source = folder.join("frames 01.yuv");
  let black = Nv21Buffer::uniform(4, 4, 16, 128, 128).unwrap();
  std::fs::write(&source, black.frame().unwrap().as_bytes()).unwrap();

  let input = InputWrapper::from_url(&scheme_url("nv21", &source, Some("width=4&height=4"))).unwrap();
  let target = folder.join("输出 张量.f32");
  let output = OutputWrapper::from_url(&scheme_url("tensor", &target, None)).unwrap();
  let converter = FrameConverter::new(2, 2).unwrap();

  OneShotTask.run_task(input, &converter, output).unwrap();
  let values = read_f32(&target);
  assert_eq!(values.len(), 3 * 2 * 2);
  assert!(values.iter().all(|&v| v == 0.0));
}

#[test]
fn pattern_stream_to_numbered_tensor_files() {
  let dir = tempfile::tempdir().unwrap();
  let target = dir.path().join("frame.f32");
  let input = InputWrapper::from_url(
    &Url::parse("pattern://bars?width=16&height=8&frames=3").unwrap(),
  )
  .unwrap();
  let output = OutputWrapper::from_url(&scheme_url("tensor", &target, Some("per_frame"))).unwrap();
  let converter = FrameConverter::new(8, 8).unwrap();

  let summary = ContinuousTask::default()
    .with_drop_frames(false)
    .with_interrupt_handler(false)
    .run_task(input, &converter, output)
    .unwrap();
  assert_eq!(summary.converted, 3);
  assert_eq!(summary.dropped, 0);

  for index in 0..3 {
    let path = dir.path().join(format!("frame-{index:06}.f32"));
    assert_eq!(read_f32(&path).len(), 3 * 8 * 8);
  }
}

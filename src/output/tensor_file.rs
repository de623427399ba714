// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/tensor_file.rs - 张量文件输出
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

//! 将张量保存为原始小端 f32 文件，并在同名 `.json` 中记录形状。
//!
//! ```text
//! tensor:///path/to/frame.f32            每帧覆盖同一文件
//! tensor:///path/to/frame.f32?per_frame  按帧编号生成 frame-000000.f32 ...
//! ```

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::Nv21Buffer,
  output::{Render, write_tensor},
  tensor::NchwTensor,
  url_path,
};

#[derive(Error, Debug)]
pub enum TensorFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub struct TensorFileOutput {
  path: PathBuf,
  per_frame: bool,
}

impl FromUrlWithScheme for TensorFileOutput {
  const SCHEME: &'static str = "tensor";
}

impl FromUrl for TensorFileOutput {
  type Error = TensorFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(TensorFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(TensorFileOutput {
      path: url_path(uri)?,
      per_frame: uri.query_pairs().any(|(k, _)| k == "per_frame"),
    })
  }
}

impl TensorFileOutput {
  pub fn new(path: impl Into<PathBuf>, per_frame: bool) -> Self {
    Self {
      path: path.into(),
      per_frame,
    }
  }

  pub(crate) fn frame_path(&self, index: u64) -> PathBuf {
    if !self.per_frame {
      return self.path.clone();
    }
    let stem = self
      .path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| "frame".to_string());
    let ext = self
      .path
      .extension()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| "f32".to_string());
    self
      .path
      .with_file_name(format!("{}-{:06}.{}", stem, index, ext))
  }
}

impl Render<Nv21Buffer, NchwTensor> for TensorFileOutput {
  type Error = TensorFileError;

  fn render_result(&self, frame: &Nv21Buffer, result: &NchwTensor) -> Result<(), Self::Error> {
    let path = self.frame_path(frame.index());
    write_tensor(&path, result)?;
    info!("保存张量到文件: {}", path.display());
    Ok(())
  }
}

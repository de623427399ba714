// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

//! 按日期分目录记录每帧张量：
//!
//! ```text
//! folder:///data/record            <dir>/YYYY/MM/DD/HH-MM-SS-XXXX.f32 (+ .json)
//! folder:///data/record?preview    额外保存 .png 预览（需要 save_image_file 特性）
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::Nv21Buffer,
  output::{Render, write_tensor},
  tensor::NchwTensor,
  url_path,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[cfg(feature = "save_image_file")]
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

pub struct DirectoryRecordOutput {
  directory: PathBuf,
  frame_counters: Arc<Mutex<u16>>,
  preview: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let preview = uri.query_pairs().any(|(k, _)| k == "preview");
    #[cfg(not(feature = "save_image_file"))]
    if preview {
      tracing::warn!("未启用 save_image_file 特性，忽略 preview 参数");
    }

    Ok(DirectoryRecordOutput {
      directory: url_path(uri)?,
      frame_counters: Arc::new(Mutex::new(0)),
      preview,
    })
  }
}

impl DirectoryRecordOutput {
  pub fn preview(&self) -> bool {
    self.preview
  }

  fn frame_id(&self) -> u16 {
    let mut counter = self
      .frame_counters
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  fn frame_path(&self) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.f32",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }
}

impl Render<Nv21Buffer, NchwTensor> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &Nv21Buffer, result: &NchwTensor) -> Result<(), Self::Error> {
    let path = self.frame_path()?;
    write_tensor(&path, result)?;
    #[cfg(feature = "save_image_file")]
    if self.preview {
      result.to_rgb_image().save(path.with_extension("png"))?;
    }
    debug!("记录第 {} 帧: {}", frame.index(), path.display());
    Ok(())
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output.rs - 输出定义
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

use std::path::Path;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::Nv21Buffer, tensor::NchwTensor};

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

mod tensor_file;
pub use self::tensor_file::{TensorFileError, TensorFileOutput};

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

/// 写入张量原始数据（小端 f32）及其 JSON 描述
pub(crate) fn write_tensor(path: &Path, tensor: &NchwTensor) -> std::io::Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, tensor.to_le_bytes())?;
  let meta = serde_json::to_vec_pretty(&tensor.metadata()).map_err(std::io::Error::other)?;
  std::fs::write(path.with_extension("json"), meta)?;
  debug!("写入张量: {} ({} 个元素)", path.display(), tensor.len());
  Ok(())
}

/// 丢弃结果，用于基准测试
#[derive(Debug, Default)]
pub struct NullOutput;

impl FromUrlWithScheme for NullOutput {
  const SCHEME: &'static str = "null";
}

impl FromUrl for NullOutput {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OutputError::SchemeMismatch);
    }
    Ok(NullOutput)
  }
}

impl<F, T> Render<F, T> for NullOutput {
  type Error = OutputError;

  fn render_result(&self, _frame: &F, _result: &T) -> Result<(), Self::Error> {
    Ok(())
  }
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("张量文件输出错误: {0}")]
  TensorFileError(#[from] TensorFileError),
  #[cfg(feature = "save_image_file")]
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  TensorFileOutput(TensorFileOutput),
  #[cfg(feature = "save_image_file")]
  SaveImageFileOutput(SaveImageFileOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecordOutput(DirectoryRecordOutput),
  NullOutput(NullOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      TensorFileOutput::SCHEME => {
        let output = TensorFileOutput::from_url(url)?;
        Ok(OutputWrapper::TensorFileOutput(output))
      }
      #[cfg(feature = "save_image_file")]
      SaveImageFileOutput::SCHEME => {
        let output = SaveImageFileOutput::from_url(url)?;
        Ok(OutputWrapper::SaveImageFileOutput(output))
      }
      #[cfg(feature = "directory_record")]
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecordOutput(output))
      }
      NullOutput::SCHEME => Ok(OutputWrapper::NullOutput(NullOutput)),
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl Render<Nv21Buffer, NchwTensor> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, frame: &Nv21Buffer, result: &NchwTensor) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::TensorFileOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "save_image_file")]
      OutputWrapper::SaveImageFileOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      OutputWrapper::NullOutput(output) => output.render_result(frame, result),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dispatches_by_scheme() {
    let url = Url::parse("null://").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url).unwrap(),
      OutputWrapper::NullOutput(_)
    ));
    let url = Url::parse("tensor:///tmp/out.f32").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url).unwrap(),
      OutputWrapper::TensorFileOutput(_)
    ));
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = Url::parse("rtsp://host/stream").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Err(OutputError::SchemeMismatch)
    ));
  }
}

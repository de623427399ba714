// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input.rs - NV21 帧输入
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

use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, error::ConvertError, frame::Nv21Buffer};

mod pattern;
mod raw_file;

pub use self::pattern::{Pattern, PatternInput};
pub use self::raw_file::RawFileInput;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("URI scheme mismatch: expected '{expected}', found '{found}'")]
  SchemeMismatch { expected: String, found: String },
  #[error("缺少参数: {0}")]
  MissingParameter(&'static str),
  #[error("参数 {name} 无效: {value}")]
  InvalidParameter { name: &'static str, value: String },
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("帧错误: {0}")]
  ConvertError(#[from] ConvertError),
}

impl InputError {
  pub(crate) fn check_scheme<T: FromUrlWithScheme>(url: &Url) -> Result<(), InputError> {
    if url.scheme() != T::SCHEME {
      return Err(InputError::SchemeMismatch {
        expected: T::SCHEME.to_string(),
        found: url.scheme().to_string(),
      });
    }
    Ok(())
  }
}

/// 读取查询参数
pub(crate) fn query_param<T: FromStr>(
  url: &Url,
  name: &'static str,
) -> Result<Option<T>, InputError> {
  match url.query_pairs().find(|(k, _)| k == name) {
    Some((_, v)) => v
      .parse::<T>()
      .map(Some)
      .map_err(|_| InputError::InvalidParameter {
        name,
        value: v.to_string(),
      }),
    None => Ok(None),
  }
}

pub(crate) fn required_param<T: FromStr>(url: &Url, name: &'static str) -> Result<T, InputError> {
  query_param(url, name)?.ok_or(InputError::MissingParameter(name))
}

/// 帧迭代器产出的元素；`ResourceUnavailable` 表示该帧无法获取，可跳过
pub type FrameItem = Result<Nv21Buffer, ConvertError>;

pub enum InputWrapper {
  RawFile(RawFileInput),
  Pattern(PatternInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      RawFileInput::SCHEME => Ok(InputWrapper::RawFile(RawFileInput::from_url(url)?)),
      PatternInput::SCHEME => Ok(InputWrapper::Pattern(PatternInput::from_url(url)?)),
      other => Err(InputError::SchemeMismatch {
        expected: format!("{} | {}", RawFileInput::SCHEME, PatternInput::SCHEME),
        found: other.to_string(),
      }),
    }
  }
}

impl InputWrapper {
  pub fn width(&self) -> i32 {
    match self {
      InputWrapper::RawFile(input) => input.width(),
      InputWrapper::Pattern(input) => input.width(),
    }
  }

  pub fn height(&self) -> i32 {
    match self {
      InputWrapper::RawFile(input) => input.height(),
      InputWrapper::Pattern(input) => input.height(),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = FrameItem;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      InputWrapper::RawFile(input) => input.next(),
      InputWrapper::Pattern(input) => input.next(),
    }
  }
}

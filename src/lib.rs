// 该文件是 Shanan （山南西风） 项目的一部分。
// src/lib.rs - 库主文件
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

pub mod convert;
pub mod error;
pub mod frame;
pub mod input;
pub mod output;
pub mod pack;
pub mod scale;
pub mod task;
pub mod tensor;

pub use convert::{FrameConverter, convert};
pub use error::ConvertError;
pub use frame::{AsNv21Frame, Nv21Buffer, Nv21Frame};
pub use tensor::NchwTensor;

/// 模型默认输入尺寸
pub const DEFAULT_TARGET_SIZE: i32 = 640;

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// 将 URL 路径解码为本地路径（处理空格、中文等百分号编码字符）
pub(crate) fn url_path(url: &url::Url) -> std::io::Result<std::path::PathBuf> {
  urlencoding::decode(url.path())
    .map(|path| std::path::PathBuf::from(path.into_owned()))
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
}

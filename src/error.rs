// 该文件是 Shanan （山南西风） 项目的一部分。
// src/error.rs - 转换错误定义
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

use thiserror::Error;

/// 帧转换错误
///
/// 所有错误都只影响单帧转换，不会产生部分写入的输出。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
  /// 尺寸非法或缓冲区长度不足
  #[error("输入无效: {0}")]
  InvalidInput(String),
  /// 无法获取源帧数据，应从采集管线重新获取帧
  #[error("资源不可用: {0}")]
  ResourceUnavailable(String),
}

impl ConvertError {
  pub fn invalid(msg: impl Into<String>) -> Self {
    ConvertError::InvalidInput(msg.into())
  }

  pub fn unavailable(msg: impl Into<String>) -> Self {
    ConvertError::ResourceUnavailable(msg.into())
  }

  pub fn is_invalid_input(&self) -> bool {
    matches!(self, ConvertError::InvalidInput(_))
  }

  pub fn is_resource_unavailable(&self) -> bool {
    matches!(self, ConvertError::ResourceUnavailable(_))
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/task.rs - 转换任务
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

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{self, TrySendError},
  },
  thread,
  time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::{
  convert::FrameConverter,
  error::ConvertError,
  frame::Nv21Buffer,
  input::FrameItem,
  output::Render,
  tensor::NchwTensor,
};

/// 任务统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
  /// 成功转换并输出的帧数
  pub converted: u64,
  /// 因转换器繁忙而丢弃的帧数
  pub dropped: u64,
  /// 无法获取数据而跳过的帧数
  pub unavailable: u64,
}

pub trait Task<I, O>: Sized {
  type Error;
  fn run_task(
    self,
    input: I,
    converter: &FrameConverter,
    output: O,
  ) -> Result<TaskSummary, Self::Error>;
}

/// 资源不可用的帧被跳过，其余错误向上传递
fn acquire(item: FrameItem, summary: &mut TaskSummary) -> Result<Option<Nv21Buffer>, ConvertError> {
  match item {
    Ok(frame) => Ok(Some(frame)),
    Err(ConvertError::ResourceUnavailable(msg)) => {
      warn!("跳过不可用的帧: {}", msg);
      summary.unavailable += 1;
      Ok(None)
    }
    Err(e) => Err(e),
  }
}

/// 转换单帧；帧数据已释放时返回 `None`
fn convert_one(
  converter: &FrameConverter,
  frame: &Nv21Buffer,
  summary: &mut TaskSummary,
) -> Result<Option<NchwTensor>, ConvertError> {
  match converter.convert_frame(frame) {
    Ok(tensor) => Ok(Some(tensor)),
    Err(ConvertError::ResourceUnavailable(msg)) => {
      warn!("第 {} 帧不可用: {}", frame.index(), msg);
      summary.unavailable += 1;
      Ok(None)
    }
    Err(e) => Err(e),
  }
}

pub struct OneShotTask;

impl<RE, I, O> Task<I, O> for OneShotTask
where
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = FrameItem>,
  O: Render<Nv21Buffer, NchwTensor, Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    converter: &FrameConverter,
    output: O,
  ) -> Result<TaskSummary, Self::Error> {
    info!("开始任务...");
    let mut summary = TaskSummary::default();
    for item in input {
      let Some(frame) = acquire(item, &mut summary)? else {
        continue;
      };
      info!("输入帧获取成功，开始转换...");
      let now = Instant::now();
      let Some(tensor) = convert_one(converter, &frame, &mut summary)? else {
        continue;
      };
      let elapsed = now.elapsed();
      info!("转换完成，耗时: {:.2?}", elapsed);
      output.render_result(&frame, &tensor)?;
      info!("输出完成，耗时: {:.2?}", now.elapsed());
      summary.converted = 1;
      return Ok(summary);
    }

    Err(anyhow::anyhow!("没有可用的输入帧"))
  }
}

pub struct RepeatShotTask {
  repeat: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self { repeat: 1000 }
  }
}

impl RepeatShotTask {
  pub fn with_repeat(mut self, repeat: usize) -> Self {
    self.repeat = repeat.max(1);
    self
  }
}

impl<RE, I, O> Task<I, O> for RepeatShotTask
where
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = FrameItem>,
  O: Render<Nv21Buffer, NchwTensor, Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    converter: &FrameConverter,
    output: O,
  ) -> Result<TaskSummary, Self::Error> {
    info!("开始任务...");
    let mut summary = TaskSummary::default();
    let mut frame = None;
    for item in input {
      if let Some(f) = acquire(item, &mut summary)? {
        frame = Some(f);
        break;
      }
    }
    let frame = frame.ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始重复转换 {} 次...", self.repeat);

    let mut times = Vec::with_capacity(self.repeat);
    for i in 0..self.repeat {
      let now = Instant::now();
      let tensor = converter.convert_frame(&frame)?;
      let elapsed = now.elapsed();
      debug!("({})转换完成，耗时: {:.2?}", i, elapsed);
      output.render_result(&frame, &tensor)?;
      times.push(elapsed);
      summary.converted += 1;
    }

    // 前两次视为预热
    let warmup = if times.len() > 2 { 2 } else { 0 };
    let measured = &times[warmup..];
    warn!(
      "平均转换时间: {:.2?}",
      measured.iter().sum::<Duration>() / measured.len() as u32
    );

    Ok(summary)
  }
}

/// 连续处理帧流
///
/// 读取在独立线程中进行，与转换之间只有一个槽位；转换跟不上时
/// 默认在进入转换前丢弃新帧，不在转换器内部排队。
#[derive(Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
  drop_frames: bool,
  handle_interrupt: bool,
}

impl Default for ContinuousTask {
  fn default() -> Self {
    Self {
      frame_number: None,
      drop_frames: true,
      handle_interrupt: true,
    }
  }
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  /// 为 `false` 时读取端阻塞等待，不丢帧（适合文件输入）
  pub fn with_drop_frames(mut self, drop_frames: bool) -> Self {
    self.drop_frames = drop_frames;
    self
  }

  pub fn with_interrupt_handler(mut self, handle_interrupt: bool) -> Self {
    self.handle_interrupt = handle_interrupt;
    self
  }
}

impl<RE, I, O> Task<I, O> for ContinuousTask
where
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = FrameItem> + Send + 'static,
  O: Render<Nv21Buffer, NchwTensor, Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    converter: &FrameConverter,
    output: O,
  ) -> Result<TaskSummary, Self::Error> {
    info!("开始任务...");
    let stop = Arc::new(AtomicBool::new(false));

    if self.handle_interrupt {
      let stop = stop.clone();
      ctrlc::set_handler(move || {
        info!("收到中断信号，准备退出...");
        stop.store(true, Ordering::SeqCst);
        thread::spawn(|| {
          thread::sleep(Duration::from_secs(30));
          warn!("强制退出程序");
          std::process::exit(1);
        });
      })?;
    }

    let (tx, rx) = mpsc::sync_channel::<FrameItem>(1);
    let producer = {
      let stop = stop.clone();
      let drop_frames = self.drop_frames;
      thread::spawn(move || {
        let mut dropped = 0u64;
        for item in input {
          if stop.load(Ordering::SeqCst) {
            break;
          }
          if drop_frames {
            match tx.try_send(item) {
              Ok(()) => {}
              Err(TrySendError::Full(_)) => {
                // 消费端已退出，不再计入丢帧
                if stop.load(Ordering::SeqCst) {
                  break;
                }
                dropped += 1;
                debug!("转换器繁忙，丢弃一帧（累计 {}）", dropped);
              }
              Err(TrySendError::Disconnected(_)) => break,
            }
          } else if tx.send(item).is_err() {
            break;
          }
        }
        dropped
      })
    };

    let mut summary = TaskSummary::default();
    let result = (|| -> anyhow::Result<()> {
      let mut now = Instant::now();
      for item in rx.iter() {
        let Some(frame) = acquire(item, &mut summary)? else {
          continue;
        };
        info!("处理第 {} 帧图像", frame.index());
        let Some(tensor) = convert_one(converter, &frame, &mut summary)? else {
          continue;
        };
        let elapsed_a = now.elapsed();
        output.render_result(&frame, &tensor)?;
        let elapsed_b = now.elapsed();
        now = Instant::now();
        summary.converted += 1;
        info!("转换完成，耗时: {:.2?} / {:.2?}", elapsed_a, elapsed_b);

        if self
          .frame_number
          .is_some_and(|n| summary.converted as usize >= n)
        {
          info!("达到指定帧数 {}, 退出任务循环", summary.converted);
          stop.store(true, Ordering::SeqCst);
          break;
        }
        if stop.load(Ordering::SeqCst) {
          warn!("中断信号接收，退出任务循环");
          break;
        }
      }
      Ok(())
    })();

    stop.store(true, Ordering::SeqCst);
    drop(rx);
    summary.dropped = producer
      .join()
      .map_err(|_| anyhow::anyhow!("读取线程异常退出"))?;
    result?;

    if summary.dropped > 0 {
      warn!("共丢弃 {} 帧", summary.dropped);
    }
    info!("任务完成，退出");
    Ok(summary)
  }
}

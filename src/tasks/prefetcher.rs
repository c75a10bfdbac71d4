//! Asynchronous thumbnail prefetch worker.
//!
//! Owns the desired-set bookkeeping behind the cache seam: a start command
//! marks assets wanted and queues preparation, a stop aborts or evicts
//! them, stop-all drops everything. Preparation is best-effort; failures
//! are logged and forgotten, and the window manager self-corrects on the
//! next significant viewport move.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tokio::select;
use tokio::sync::mpsc::{Sender, UnboundedReceiver};
use tokio::task::{AbortHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::assets::{Asset, AssetId};
use crate::cache::{ContentMode, RequestOptions};
use crate::events::{CacheCommand, PreparedThumbnail, ThumbnailReady};

/// Produces thumbnail pixel data for one asset.
///
/// Implementations may block; the prefetcher runs them on the blocking
/// pool.
pub trait ThumbnailSource: Send + Sync + 'static {
    fn prepare(&self, asset: &Asset, options: RequestOptions) -> Result<PreparedThumbnail>;
}

/// Consumes [`CacheCommand`]s and keeps at most `max_in_flight` thumbnail
/// preparations running until cancelled or the command side hangs up.
pub async fn run(
    mut commands: UnboundedReceiver<CacheCommand>,
    source: Arc<dyn ThumbnailSource>,
    ready_tx: Sender<ThumbnailReady>,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let mut state = PrefetchState::new(max_in_flight);
    let mut jobs: JoinSet<(AssetId, Result<PreparedThumbnail>)> = JoinSet::new();
    let mut commands_open = true;

    loop {
        state.fill(&mut jobs, &source);
        if !commands_open && jobs.is_empty() {
            break;
        }

        select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting prefetcher");
                break;
            }

            maybe_cmd = commands.recv(), if commands_open => {
                match maybe_cmd {
                    Some(CacheCommand::StartCaching { assets, options }) => {
                        state.start(assets, options);
                    }
                    Some(CacheCommand::StopCaching { assets, .. }) => {
                        state.stop(&assets);
                    }
                    Some(CacheCommand::StopCachingAll) => {
                        state.stop_all();
                    }
                    None => {
                        // Controller side dropped; drain in-flight work and exit.
                        commands_open = false;
                    }
                }
            }

            Some(join_res) = jobs.join_next() => {
                let Ok((id, outcome)) = join_res else {
                    // Aborted by a stop; bookkeeping already updated.
                    continue;
                };
                state.in_flight.remove(&id);
                match outcome {
                    Ok(thumbnail) if state.wanted.contains(&id) => {
                        debug!(asset = %id, "thumbnail prepared");
                        state.prepared.insert(id);
                        let _ = ready_tx.send(ThumbnailReady(thumbnail)).await;
                    }
                    Ok(_) => {
                        debug!(asset = %id, "thumbnail no longer wanted; dropping");
                    }
                    Err(err) => {
                        debug!(asset = %id, error = %err, "thumbnail preparation failed");
                    }
                }
            }
        }
    }
    Ok(())
}

struct PrefetchState {
    max_in_flight: usize,
    wanted: HashSet<AssetId>,
    prepared: HashSet<AssetId>,
    queue: VecDeque<(Asset, RequestOptions)>,
    in_flight: HashMap<AssetId, AbortHandle>,
}

impl PrefetchState {
    fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            wanted: HashSet::new(),
            prepared: HashSet::new(),
            queue: VecDeque::new(),
            in_flight: HashMap::new(),
        }
    }

    fn start(&mut self, assets: Vec<Asset>, options: RequestOptions) {
        for asset in assets {
            // Already queued, in flight, or prepared.
            if !self.wanted.insert(asset.id.clone()) {
                continue;
            }
            self.queue.push_back((asset, options));
        }
    }

    fn stop(&mut self, assets: &[Asset]) {
        for asset in assets {
            if !self.wanted.remove(&asset.id) {
                continue;
            }
            self.prepared.remove(&asset.id);
            self.queue.retain(|(queued, _)| queued.id != asset.id);
            if let Some(handle) = self.in_flight.remove(&asset.id) {
                debug!(asset = %asset.id, "aborting in-flight preparation");
                handle.abort();
            }
        }
    }

    fn stop_all(&mut self) {
        debug!(evicted = self.prepared.len(), "clearing the whole cache");
        self.wanted.clear();
        self.prepared.clear();
        self.queue.clear();
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
    }

    fn fill(
        &mut self,
        jobs: &mut JoinSet<(AssetId, Result<PreparedThumbnail>)>,
        source: &Arc<dyn ThumbnailSource>,
    ) {
        while self.in_flight.len() < self.max_in_flight {
            let Some((asset, options)) = self.queue.pop_front() else {
                break;
            };
            let id = asset.id.clone();
            let task_id = id.clone();
            let source = Arc::clone(source);
            let handle = jobs.spawn(async move {
                let prep =
                    tokio::task::spawn_blocking(move || source.prepare(&asset, options)).await;
                let outcome = match prep {
                    Ok(res) => res,
                    Err(join_err) => Err(anyhow::anyhow!(join_err)),
                };
                (task_id, outcome)
            });
            self.in_flight.insert(id, handle);
        }
    }
}

/// Disk-backed source. The asset id is the file path, as produced by the
/// folder library.
#[derive(Debug, Default)]
pub struct FileThumbnailSource;

impl FileThumbnailSource {
    pub fn new() -> Self {
        Self
    }
}

impl ThumbnailSource for FileThumbnailSource {
    fn prepare(&self, asset: &Asset, options: RequestOptions) -> Result<PreparedThumbnail> {
        let path = PathBuf::from(asset.id.as_str());
        let decoded = image::ImageReader::open(&path)?
            .with_guessed_format()?
            .decode()?;
        let upright = apply_orientation(decoded.to_rgba8(), orientation_of(&path));
        let sized = resize_for(upright, options);
        let (width, height) = sized.dimensions();
        Ok(PreparedThumbnail {
            id: asset.id.clone(),
            width,
            height,
            pixels: sized.into_raw(),
        })
    }
}

fn orientation_of(path: &Path) -> u16 {
    let Ok(file) = File::open(path) else {
        return 1;
    };
    let mut reader = BufReader::new(file);
    let Ok(metadata) = exif::Reader::new().read_from_container(&mut reader) else {
        return 1;
    };
    metadata
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(|value| value as u16)
        .unwrap_or(1)
}

/// Map an EXIF orientation tag to the upright image. Unknown values pass
/// the image through unchanged.
fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&img),
        3 => imageops::rotate180(&img),
        4 => imageops::flip_vertical(&img),
        5 => imageops::flip_horizontal(&imageops::rotate90(&img)),
        6 => imageops::rotate90(&img),
        7 => imageops::flip_horizontal(&imageops::rotate270(&img)),
        8 => imageops::rotate270(&img),
        _ => img,
    }
}

fn resize_for(img: RgbaImage, options: RequestOptions) -> RgbaImage {
    let (width, height) = img.dimensions();
    let target_w = options.target_size.width.max(1);
    let target_h = options.target_size.height.max(1);
    let fit = target_w as f64 / width as f64;
    let fill = target_h as f64 / height as f64;

    match options.mode {
        ContentMode::AspectFit => {
            let scale = fit.min(fill);
            let out_w = ((width as f64 * scale).round() as u32).max(1);
            let out_h = ((height as f64 * scale).round() as u32).max(1);
            imageops::resize(&img, out_w, out_h, FilterType::Triangle)
        }
        ContentMode::AspectFill => {
            let scale = fit.max(fill);
            let scaled_w = ((width as f64 * scale).ceil() as u32).max(target_w);
            let scaled_h = ((height as f64 * scale).ceil() as u32).max(target_h);
            let scaled = imageops::resize(&img, scaled_w, scaled_h, FilterType::Triangle);
            let x = (scaled_w - target_w) / 2;
            let y = (scaled_h - target_h) / 2;
            imageops::crop_imm(&scaled, x, y, target_w, target_h).to_image()
        }
    }
}

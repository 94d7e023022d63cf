use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::assets::generate::{GenContext, generator_for};
use crate::foundation::error::{SpinError, SpinResult};
use crate::wheel::layout::LayoutKind;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Cached raster in premultiplied RGBA8 form.
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Vec<u8>,
}

impl RasterImage {
    /// Wrap a pixel buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> SpinResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if rgba8_premul.len() != expected {
            return Err(SpinError::generation(format!(
                "raster {width}x{height} expects {expected} bytes, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul,
        })
    }

    /// Premultiplied pixel at `(x, y)`; transparent outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.rgba8_premul[i],
            self.rgba8_premul[i + 1],
            self.rgba8_premul[i + 2],
            self.rgba8_premul[i + 3],
        ]
    }

    /// `width × height × 4`.
    pub fn byte_estimate(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * 4
    }
}

/// Closed set of cacheable static layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Rim, track and colored pocket sectors.
    WheelBase,
    /// Pocket numbers, rotated along the numeral band.
    NumeralOverlay,
    /// Per-pixel pocket index (red channel), alpha 0 outside the pocket bands.
    HitMask,
    /// The ball.
    BallSprite,
    /// One texel per pocket holding its fill color.
    ColorMap,
}

impl AssetKind {
    /// Every kind, in generation-friendly order.
    pub const ALL: [AssetKind; 5] = [
        AssetKind::ColorMap,
        AssetKind::WheelBase,
        AssetKind::NumeralOverlay,
        AssetKind::HitMask,
        AssetKind::BallSprite,
    ];

    /// Ball sprite edge for a given wheel diameter.
    pub fn ball_px(wheel_px: u32) -> u32 {
        (wheel_px / 22).max(6)
    }

    /// Static descriptor of this kind for a wheel of `wheel_px` diameter on `layout`.
    pub fn descriptor(self, layout: LayoutKind, wheel_px: u32) -> AssetDescriptor {
        match self {
            Self::WheelBase => AssetDescriptor {
                width: wheel_px,
                height: wheel_px,
                depends_on: &[AssetKind::ColorMap],
                volatile: false,
            },
            Self::NumeralOverlay | Self::HitMask => AssetDescriptor {
                width: wheel_px,
                height: wheel_px,
                depends_on: &[],
                volatile: false,
            },
            Self::BallSprite => {
                let s = Self::ball_px(wheel_px);
                AssetDescriptor {
                    width: s,
                    height: s,
                    depends_on: &[],
                    volatile: true,
                }
            }
            Self::ColorMap => AssetDescriptor {
                width: layout.layout().len() as u32,
                height: 1,
                depends_on: &[],
                volatile: false,
            },
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::WheelBase => "wheel_base",
            Self::NumeralOverlay => "numeral_overlay",
            Self::HitMask => "hit_mask",
            Self::BallSprite => "ball_sprite",
            Self::ColorMap => "color_map",
        };
        f.write_str(s)
    }
}

/// Static size and lifecycle facts about one asset kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Kinds that must be resident before this one is generated.
    pub depends_on: &'static [AssetKind],
    /// Whether the entry may be evicted by [`AssetCache::clear_volatile`].
    pub volatile: bool,
}

/// Identity of one cached raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct AssetKey {
    /// Layer kind.
    pub kind: AssetKind,
    /// Wheel arrangement the layer depicts.
    pub layout: LayoutKind,
    /// Wheel diameter in pixels.
    pub wheel_px: u32,
}

impl AssetKey {
    /// Build a key.
    pub fn new(kind: AssetKind, layout: LayoutKind, wheel_px: u32) -> Self {
        Self {
            kind,
            layout,
            wheel_px,
        }
    }

    /// Same layout and size, different kind.
    pub fn with_kind(self, kind: AssetKind) -> Self {
        Self { kind, ..self }
    }

    /// Descriptor of this key.
    pub fn descriptor(self) -> AssetDescriptor {
        self.kind.descriptor(self.layout, self.wheel_px)
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}px", self.kind, self.layout, self.wheel_px)
    }
}

/// One resident cache entry.
#[derive(Clone, Debug)]
pub struct CachedAsset {
    /// Entry identity.
    pub key: AssetKey,
    /// Shared raster.
    pub image: Arc<RasterImage>,
    /// `width × height × 4` at insertion time.
    pub byte_estimate: u64,
    /// Copied from the descriptor.
    pub volatile: bool,
}

/// Thresholds behind [`AssetCache::health`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CacheLimits {
    /// Resident bytes above which the cache reports degraded.
    pub memory_ceiling_bytes: u64,
    /// Hit rate below which the cache reports degraded.
    pub min_hit_rate: f64,
    /// Lookups required before the hit rate is judged.
    pub min_lookups: u64,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            memory_ceiling_bytes: 64 * 1024 * 1024,
            min_hit_rate: 0.5,
            min_lookups: 8,
        }
    }
}

/// Counter snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Lookups served from a resident entry.
    pub hits: u64,
    /// Lookups that ran a generator.
    pub misses: u64,
    /// Resident entries.
    pub entries: usize,
    /// Resident volatile entries.
    pub volatile_entries: usize,
    /// Running byte estimate of resident rasters.
    pub total_bytes: u64,
}

impl CacheStats {
    /// `hits / (hits + misses)`, or `1.0` before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            1.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Coarse verdict of [`AssetCache::health`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthVerdict {
    /// Hit rate and footprint within limits.
    Healthy,
    /// Low hit rate or high memory footprint.
    Degraded,
}

impl HealthVerdict {
    /// `true` for [`HealthVerdict::Healthy`].
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Observability snapshot of the cache.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CacheHealthReport {
    /// Counters at snapshot time.
    pub stats: CacheStats,
    /// Overall verdict.
    pub verdict: HealthVerdict,
    /// Human-readable reasons for a degraded verdict.
    pub reasons: Vec<String>,
    /// Largest resident entry and its byte estimate.
    pub largest: Option<(AssetKey, u64)>,
}

/// Problem found by [`AssetCache::validate`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum CacheIssue {
    /// The entry's raster does not match its key's descriptor.
    DescriptorMismatch {
        /// Offending key.
        key: AssetKey,
        /// Descriptor size.
        expected: (u32, u32),
        /// Actual raster size.
        actual: (u32, u32),
    },
    /// Recorded byte estimate disagrees with the raster buffer.
    SizeMismatch {
        /// Offending key.
        key: AssetKey,
        /// Recorded estimate.
        recorded: u64,
        /// Actual buffer length.
        actual: u64,
    },
    /// The running total disagrees with the sum of entries.
    AccountingDrift {
        /// Running total.
        recorded: u64,
        /// Recomputed sum.
        actual: u64,
    },
}

#[derive(Default)]
struct Entries {
    map: HashMap<AssetKey, CachedAsset>,
    total_bytes: u64,
}

/// Lazily generated, shared store of static raster layers.
///
/// Generators run without holding the table lock. Two threads racing on the same missing key may
/// both generate it; the first insert wins and both callers get the resident instance. A failing
/// generator leaves the table untouched.
pub struct AssetCache {
    entries: RwLock<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
    limits: CacheLimits,
    fontdb: OnceLock<Arc<usvg::fontdb::Database>>,
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCache")
            .field("stats", &self.stats())
            .field("limits", &self.limits)
            .finish()
    }
}

impl AssetCache {
    /// Empty cache with default limits.
    pub fn new() -> Self {
        Self::with_limits(CacheLimits::default())
    }

    /// Empty cache with explicit health thresholds.
    pub fn with_limits(limits: CacheLimits) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            limits,
            fontdb: OnceLock::new(),
        }
    }

    /// Use a pre-built font database instead of loading system fonts on first text generation.
    pub fn with_fontdb(self, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        let _ = self.fontdb.set(fontdb);
        self
    }

    /// Return the raster for `key`, generating it (and its dependencies) on a miss.
    pub fn get(&self, key: AssetKey) -> SpinResult<Arc<RasterImage>> {
        if let Some(hit) = self.entries.read().map.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit.image.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let descriptor = key.descriptor();

        let mut deps = HashMap::with_capacity(descriptor.depends_on.len());
        for &dep in descriptor.depends_on {
            deps.insert(dep, self.get(key.with_kind(dep))?);
        }

        let ctx = GenContext {
            key,
            descriptor,
            deps: &deps,
            fonts: &self.fontdb,
        };
        let image = generator_for(key.kind)(&ctx)?;
        if image.width != descriptor.width || image.height != descriptor.height {
            return Err(SpinError::generation(format!(
                "generator for {key} produced {}x{}, descriptor says {}x{}",
                image.width, image.height, descriptor.width, descriptor.height
            )));
        }
        tracing::debug!(%key, bytes = image.byte_estimate(), "asset generated");

        let image = Arc::new(image);
        let mut entries = self.entries.write();
        if let Some(resident) = entries.map.get(&key) {
            return Ok(resident.image.clone());
        }
        let byte_estimate = image.byte_estimate();
        entries.total_bytes += byte_estimate;
        entries.map.insert(
            key,
            CachedAsset {
                key,
                image: image.clone(),
                byte_estimate,
                volatile: descriptor.volatile,
            },
        );
        Ok(image)
    }

    /// Whether `key` is resident. Does not touch the counters.
    pub fn contains(&self, key: AssetKey) -> bool {
        self.entries.read().map.contains_key(&key)
    }

    /// Resident entry for `key` without counting a lookup.
    pub fn peek(&self, key: AssetKey) -> Option<CachedAsset> {
        self.entries.read().map.get(&key).cloned()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.map.clear();
        entries.total_bytes = 0;
    }

    /// Drop only volatile entries, returning how many were evicted.
    pub fn clear_volatile(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.map.len();
        let mut freed = 0u64;
        entries.map.retain(|_, e| {
            if e.volatile {
                freed += e.byte_estimate;
                false
            } else {
                true
            }
        });
        entries.total_bytes = entries.total_bytes.saturating_sub(freed);
        before - entries.map.len()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.map.len(),
            volatile_entries: entries.map.values().filter(|e| e.volatile).count(),
            total_bytes: entries.total_bytes,
        }
    }

    /// Largest resident entry by byte estimate; ties resolve to the smallest key.
    pub fn largest_asset(&self) -> Option<(AssetKey, u64)> {
        let entries = self.entries.read();
        entries
            .map
            .values()
            .map(|e| (e.key, e.byte_estimate))
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
    }

    /// Coarse health verdict with reasons.
    pub fn health(&self) -> CacheHealthReport {
        let stats = self.stats();
        let mut reasons = Vec::new();
        let lookups = stats.hits + stats.misses;
        if lookups >= self.limits.min_lookups && stats.hit_rate() < self.limits.min_hit_rate {
            reasons.push(format!(
                "hit rate {:.2} below {:.2} after {lookups} lookups",
                stats.hit_rate(),
                self.limits.min_hit_rate
            ));
        }
        if stats.total_bytes > self.limits.memory_ceiling_bytes {
            reasons.push(format!(
                "{} resident bytes above ceiling {}",
                stats.total_bytes, self.limits.memory_ceiling_bytes
            ));
        }
        let verdict = if reasons.is_empty() {
            HealthVerdict::Healthy
        } else {
            HealthVerdict::Degraded
        };
        CacheHealthReport {
            stats,
            verdict,
            reasons,
            largest: self.largest_asset(),
        }
    }

    /// Consistency pass over resident entries.
    pub fn validate(&self) -> Vec<CacheIssue> {
        let entries = self.entries.read();
        let mut issues = Vec::new();
        let mut keys: Vec<_> = entries.map.keys().copied().collect();
        keys.sort();

        let mut sum = 0u64;
        for key in keys {
            let e = &entries.map[&key];
            let d = key.descriptor();
            if (e.image.width, e.image.height) != (d.width, d.height) {
                issues.push(CacheIssue::DescriptorMismatch {
                    key,
                    expected: (d.width, d.height),
                    actual: (e.image.width, e.image.height),
                });
            }
            let actual = e.image.rgba8_premul.len() as u64;
            if e.byte_estimate != actual || e.byte_estimate != e.image.byte_estimate() {
                issues.push(CacheIssue::SizeMismatch {
                    key,
                    recorded: e.byte_estimate,
                    actual,
                });
            }
            sum += e.byte_estimate;
        }
        if sum != entries.total_bytes {
            issues.push(CacheIssue::AccountingDrift {
                recorded: entries.total_bytes,
                actual: sum,
            });
        }
        issues
    }

    /// Font database shared by every text-bearing layer generated through this cache.
    pub(crate) fn fontdb(&self) -> &Arc<usvg::fontdb::Database> {
        self.fontdb
            .get_or_init(crate::assets::svg_raster::system_fontdb)
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, entry: CachedAsset) {
        let mut entries = self.entries.write();
        entries.total_bytes += entry.byte_estimate;
        entries.map.insert(entry.key, entry);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;

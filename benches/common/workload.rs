//! Deterministic key streams for hit-rate and throughput benchmarks.
//!
//! Seeded so every cache variant sees the exact same sequence.

use std::sync::Arc;

use lrukit::traits::CoreCache;

/// Key distribution over `[0, universe)`.
#[derive(Debug, Clone, Copy)]
pub enum Workload {
    Uniform,
    /// `hot_prob` of the requests go to the first `hot_fraction` of keys.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Cycles through every key in order; defeats any recency policy.
    Scan,
    /// Skewed popularity; `theta` 0.99 matches YCSB.
    Zipfian { theta: f64 },
}

impl Workload {
    /// Workloads every bench file reports on.
    pub fn standard() -> [(&'static str, Workload); 4] {
        [
            ("uniform", Workload::Uniform),
            (
                "hotset_90_10",
                Workload::Hotset {
                    hot_fraction: 0.1,
                    hot_prob: 0.9,
                },
            ),
            ("scan", Workload::Scan),
            ("zipfian_0.99", Workload::Zipfian { theta: 0.99 }),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct KeyStream {
    universe: u64,
    workload: Workload,
    rng: XorShift64,
    scan_pos: u64,
    zipfian: Option<Zipfian>,
}

impl KeyStream {
    pub fn new(universe: u64, workload: Workload, seed: u64) -> Self {
        let universe = universe.max(2);
        let zipfian = match workload {
            Workload::Zipfian { theta } => Some(Zipfian::new(universe, theta)),
            _ => None,
        };
        Self {
            universe,
            workload,
            rng: XorShift64::new(seed),
            scan_pos: 0,
            zipfian,
        }
    }

    pub fn next_key(&mut self) -> u64 {
        match (self.workload, &self.zipfian) {
            (Workload::Zipfian { .. }, Some(zipf)) => zipf.sample(self.rng.next_f64()),
            (Workload::Hotset {
                hot_fraction,
                hot_prob,
            }, _) => {
                let hot = ((self.universe as f64 * hot_fraction.clamp(0.0, 1.0)).round() as u64)
                    .clamp(1, self.universe - 1);
                if self.rng.next_f64() < hot_prob {
                    self.rng.next_u64() % hot
                } else {
                    hot + self.rng.next_u64() % (self.universe - hot)
                }
            },
            (Workload::Scan, _) => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },
            _ => self.rng.next_u64() % self.universe,
        }
    }

    /// Collects `n` keys up front so timing loops do no generation work.
    pub fn take_keys(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.next_key()).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HitRate {
    pub hits: u64,
    pub misses: u64,
}

impl HitRate {
    pub fn ratio(self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Drives `cache` as a read-through cache: look up, on miss put.
pub fn run_hit_rate<C, V>(
    cache: &mut C,
    keys: &[u64],
    value_for_key: impl Fn(u64) -> Arc<V>,
) -> HitRate
where
    C: CoreCache<u64, Arc<V>>,
{
    let mut rate = HitRate::default();
    for &key in keys {
        if cache.get(&key).is_some() {
            rate.hits += 1;
        } else {
            rate.misses += 1;
            cache.put(key, value_for_key(key));
        }
    }
    rate
}

/// YCSB inverse-CDF Zipfian sampler.
#[derive(Debug, Clone)]
struct Zipfian {
    n: u64,
    theta: f64,
    zeta_n: f64,
    alpha: f64,
    eta: f64,
}

impl Zipfian {
    fn new(n: u64, theta: f64) -> Self {
        let theta = theta.clamp(0.0, 0.9999);
        let zeta = |n: u64| (1..=n).map(|i| 1.0 / (i as f64).powf(theta)).sum::<f64>();
        let zeta_2 = zeta(2);
        let zeta_n = zeta(n);
        Self {
            n,
            theta,
            zeta_n,
            alpha: 1.0 / (1.0 - theta),
            eta: (1.0 - (2.0 / n as f64).powf(1.0 - theta)) / (1.0 - zeta_2 / zeta_n),
        }
    }

    fn sample(&self, u: f64) -> u64 {
        let uz = u * self.zeta_n;
        if uz < 1.0 {
            return 0;
        }
        if uz < 1.0 + 0.5_f64.powf(self.theta) {
            return 1;
        }
        let spread = self.n as f64 * (self.eta * u - self.eta + 1.0).powf(self.alpha);
        (spread as u64).min(self.n - 1)
    }
}

#[derive(Debug, Clone, Copy)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

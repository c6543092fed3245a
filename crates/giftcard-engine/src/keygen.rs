//! 礼品卡公开码 / 密钥生成器
//!
//! 同一进程内所有发行任务共享一个随机源，用互斥锁串行化访问。

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 公开码长度（纯数字）
pub const PUBLIC_CODE_LENGTH: usize = 12;
/// 密钥长度（大写字母 + 数字），核销/校验请求按此长度校验
pub const SECRET_CODE_LENGTH: usize = 16;

const NUMBERS: &[u8] = b"0123456789";
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 一对新生成的卡号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_code: String,
    pub secret_code: String,
}

/// 线程安全的卡号生成器
pub struct KeyGenerator {
    rng: Mutex<StdRng>,
}

impl KeyGenerator {
    /// 使用操作系统熵源初始化
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// 固定种子，便于测试复现
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// 生成一对公开码和密钥
    pub fn generate(&self) -> KeyPair {
        let mut rng = self.rng.lock();
        KeyPair {
            public_code: random_string(&mut *rng, PUBLIC_CODE_LENGTH, NUMBERS),
            secret_code: random_string(&mut *rng, SECRET_CODE_LENGTH, ALPHANUMERIC),
        }
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn random_string<R: Rng>(rng: &mut R, length: usize, charset: &[u8]) -> String {
    (0..length)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// 密钥统一转为大写后查询
pub fn normalize_secret(secret: &str) -> String {
    secret.trim().to_uppercase()
}

/// 校验密钥格式：长度固定，且只包含字母和数字
pub fn is_well_formed_secret(secret: &str) -> bool {
    secret.len() == SECRET_CODE_LENGTH && secret.chars().all(|c| c.is_ascii_alphanumeric())
}

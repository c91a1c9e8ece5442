//! 通用工具函数

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// 模拟血红蛋白测量值下限，单位为0.1 g/dL
pub const HB_MIN_TENTHS: u32 = 80;
/// 模拟血红蛋白测量值上限，单位为0.1 g/dL
pub const HB_MAX_TENTHS: u32 = 170;

/// 生成 [8.0, 17.0] 区间内、保留一位小数的随机测量值
///
/// 以十分位整数取样，两端都可能取到，且不会出现舍入越界。
pub fn random_hb_value<R: Rng + ?Sized>(rng: &mut R) -> String {
    let tenths = rng.gen_range(HB_MIN_TENTHS..=HB_MAX_TENTHS);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// 生成带盐的口令摘要，格式为 `<salt>$<sha256 hex>`
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest(&salt, password))
}

/// 校验口令是否与存储的摘要匹配
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

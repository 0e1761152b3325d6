/// 逐元素写入的前缀长度，之后改用整块复制
const SEED_LEN: usize = 128;

/// 以指数倍增的方式将整个缓冲区填充为同一个值
///
/// 先逐个写入前 `min(len, 128)` 个元素，然后不断把已填充的前缀整块复制到
/// 剩余部分，每轮复制的块大小翻倍，总共只需 O(log n) 次批量复制。
/// 对任意长度（包括 0 和小于 128 的长度）都成立。
pub fn fill<T: Copy>(buffer: &mut [T], value: T) {
    let len = buffer.len();
    let mut filled = len.min(SEED_LEN);

    for element in &mut buffer[..filled] {
        *element = value;
    }

    while filled < len {
        let count = filled.min(len - filled);
        buffer.copy_within(0..count, filled);
        filled += count;
    }
}

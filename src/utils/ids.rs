use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix on work ids
pub const WORK_ID_SUFFIX_LEN: usize = 9;

/// Random lowercase base-36 string of `len` characters
pub fn random_base36<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

/// `work_<epoch-millis>_<9 base-36 chars>`
pub fn work_id<R: Rng>(rng: &mut R, now_millis: i64) -> String {
    format!("work_{}_{}", now_millis, random_base36(rng, WORK_ID_SUFFIX_LEN))
}

/// `google_user_<NNNN>` with a four-digit number in 1000..=9999
pub fn synthetic_username<R: Rng>(rng: &mut R) -> String {
    format!("google_user_{}", rng.random_range(1000..=9999))
}

/// Placeholder password stored for synthetic accounts
pub fn synthetic_password(now_millis: i64) -> String {
    format!("simulated_google_password_{}", now_millis)
}

/// Whether `id` has the shape produced by [`work_id`]
#[cfg(test)]
pub fn is_work_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix("work_") else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('_') else {
        return false;
    };

    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == WORK_ID_SUFFIX_LEN
        && suffix.bytes().all(|b| BASE36.contains(&b))
}

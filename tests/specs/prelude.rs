//! Shared fixtures for the behavioral specs.

use std::path::{Path, PathBuf};

/// Options a spec can tweak in the generated config file.
pub struct ConfigOptions {
    pub intervals: [u32; 4],
    pub inline_l2: bool,
    pub inline_l3: bool,
    pub keep_last: bool,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            intervals: [1, 2, 4, 30],
            inline_l2: true,
            inline_l3: true,
            keep_last: false,
        }
    }
}

/// Write a config file rooted in `dir` and return its path.
pub fn write_config(dir: &Path, options: &ConfigOptions) -> PathBuf {
    let [l1, l2, l3, l4] = options.intervals;
    let body = format!(
        r#"
[basic]
ckpt_dir = "{root}/ckpt"
glob_dir = "{root}/glob"
meta_dir = "{root}/meta"
noti_file = "{root}/notifications.log"
verbosity = "quiet"
keep_last = {keep_last}

[checkpoint]
ckpt_l1 = {l1}
ckpt_l2 = {l2}
ckpt_l3 = {l3}
ckpt_l4 = {l4}
inline_l2 = {inline_l2}
inline_l3 = {inline_l3}
"#,
        root = dir.display(),
        keep_last = options.keep_last,
        inline_l2 = options.inline_l2,
        inline_l3 = options.inline_l3,
    );
    let path = dir.join("strata.toml");
    std::fs::write(&path, body).unwrap();
    path
}

/// Path of a rank's checkpoint file under the config rooted in `dir`.
pub fn ckpt_file(dir: &Path, tier: u8, group: u32, rank: u32, ckpt_id: u64) -> PathBuf {
    let root = if tier == 4 { "glob" } else { "ckpt" };
    dir.join(root)
        .join(format!("l{tier}"))
        .join(group.to_string())
        .join(format!("rank-{rank}-ckpt-{ckpt_id}"))
}

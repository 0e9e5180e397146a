//! The per-folder `desktop.ini` that points Explorer at a custom icon.

use serde::Serialize;

/// Name of the configuration file written into customized folders.
pub const CONFIG_FILE_NAME: &str = "desktop.ini";
/// Tooltip shown by Explorer for customized folders.
pub const INFO_TIP: &str = "Custom folder icon";
/// Index of the image inside the icon file.
pub const ICON_INDEX: u32 = 0;

const SECTION: &str = ".ShellClassInfo";

/// The `[.ShellClassInfo]` entries this tool reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopIni {
    pub icon_resource: String,
    pub icon_index: u32,
    pub info_tip: Option<String>,
}

impl DesktopIni {
    /// The entry written on install: `icon_path` at [`ICON_INDEX`] with [`INFO_TIP`].
    pub fn for_icon(icon_path: impl Into<String>) -> Self {
        Self {
            icon_resource: icon_path.into(),
            icon_index: ICON_INDEX,
            info_tip: Some(INFO_TIP.to_string()),
        }
    }

    /// Render the file exactly as Explorer expects it, `\n` line endings included.
    pub fn render(&self) -> String {
        let mut out = format!(
            "[{SECTION}]\nIconResource={},{}\n",
            self.icon_resource, self.icon_index
        );
        if let Some(ref tip) = self.info_tip {
            out.push_str(&format!("InfoTip={tip}\n"));
        }
        out
    }

    /// Parse the icon entries of an existing `desktop.ini`.
    ///
    /// Accepts `IconResource=path,index` as well as the older
    /// `IconFile=` / `IconIndex=` pair. Keys and the section name are matched
    /// case-insensitively. Returns `None` when no icon is referenced.
    pub fn parse(text: &str) -> Option<Self> {
        let mut in_section = false;
        let mut resource: Option<(String, u32)> = None;
        let mut icon_file: Option<String> = None;
        let mut icon_index: Option<u32> = None;
        let mut info_tip: Option<String> = None;

        for line in text.lines() {
            let line = line.trim().trim_start_matches('\u{feff}');
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_section = name.trim().eq_ignore_ascii_case(SECTION);
                continue;
            }
            if !in_section {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key.eq_ignore_ascii_case("IconResource") {
                resource = Some(match value.rsplit_once(',') {
                    Some((path, idx)) => match idx.trim().parse() {
                        Ok(index) => (path.trim().to_string(), index),
                        Err(_) => (value.to_string(), 0),
                    },
                    None => (value.to_string(), 0),
                });
            } else if key.eq_ignore_ascii_case("IconFile") {
                icon_file = Some(value.to_string());
            } else if key.eq_ignore_ascii_case("IconIndex") {
                icon_index = value.parse().ok();
            } else if key.eq_ignore_ascii_case("InfoTip") {
                info_tip = Some(value.to_string());
            }
        }

        let (icon_resource, icon_index) = match (resource, icon_file) {
            (Some(r), _) => r,
            (None, Some(file)) => (file, icon_index.unwrap_or(0)),
            (None, None) => return None,
        };
        Some(Self {
            icon_resource,
            icon_index,
            info_tip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_byte_exact() {
        let ini = DesktopIni::for_icon(r"C:\Photos\folder.ico");
        assert_eq!(
            ini.render(),
            "[.ShellClassInfo]\nIconResource=C:\\Photos\\folder.ico,0\nInfoTip=Custom folder icon\n"
        );
    }

    #[test]
    fn parse_reads_back_rendered_file() {
        let ini = DesktopIni::for_icon(r"C:\PHOTOS~1\folder.ico");
        assert_eq!(DesktopIni::parse(&ini.render()), Some(ini));
    }

    #[test]
    fn parse_handles_crlf_case_and_other_sections() {
        let text = "[ViewState]\r\nMode=\r\n[.shellclassinfo]\r\niconresource = C:\\a,b\\x.ico , 3\r\n";
        let ini = DesktopIni::parse(text).unwrap();
        assert_eq!(ini.icon_resource, r"C:\a,b\x.ico");
        assert_eq!(ini.icon_index, 3);
        assert_eq!(ini.info_tip, None);
    }

    #[test]
    fn parse_accepts_legacy_icon_file_keys() {
        let text = "[.ShellClassInfo]\nIconFile=%SystemRoot%\\system32\\shell32.dll\nIconIndex=4\n";
        let ini = DesktopIni::parse(text).unwrap();
        assert_eq!(ini.icon_resource, r"%SystemRoot%\system32\shell32.dll");
        assert_eq!(ini.icon_index, 4);
    }

    #[test]
    fn parse_without_icon_is_none() {
        assert_eq!(DesktopIni::parse("[.ShellClassInfo]\nInfoTip=hello\n"), None);
        assert_eq!(DesktopIni::parse("[Other]\nIconResource=x.ico,0\n"), None);
        assert_eq!(DesktopIni::parse(""), None);
    }
}

use crate::extensions::EnabledExtensionSet;
use crate::package::PackageName;

/// Installed packages whose extension is not enabled, in installed order.
pub fn resolve_unused(installed: &[PackageName], enabled: &EnabledExtensionSet) -> Vec<PackageName> {
    installed
        .iter()
        .filter(|package| !enabled.contains(&package.extension))
        .cloned()
        .collect()
}

//! `matrix` and `check`: read-only views of the permission table.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use viapublica_core::{Capability, PermissionTable, Permissions, Role};

/// Output format for `matrix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MatrixFormat {
    /// Aligned text table
    #[default]
    Table,
    /// One `can*` record per role
    Json,
}

#[derive(Serialize)]
struct RoleRecord {
    role: Role,
    #[serde(flatten)]
    permissions: Permissions,
}

/// Print the whole `Role × Capability` table.
pub fn run<W: Write>(format: MatrixFormat, out: &mut W) -> Result<()> {
    let table = PermissionTable::global();
    match format {
        MatrixFormat::Table => {
            let width = Capability::ALL
                .iter()
                .map(|cap| cap.as_str().len())
                .max()
                .unwrap_or_default();
            write!(out, "{:width$}", "capability")?;
            for role in Role::ALL {
                write!(out, "  {role:>13}")?;
            }
            writeln!(out)?;
            for cap in Capability::ALL {
                write!(out, "{:width$}", cap.as_str())?;
                for role in Role::ALL {
                    let mark = if table.capability_for(role, cap) { "yes" } else { "-" };
                    write!(out, "  {mark:>13}")?;
                }
                writeln!(out)?;
            }
        }
        MatrixFormat::Json => {
            let records: BTreeMap<&str, RoleRecord> = Role::ALL
                .into_iter()
                .map(|role| {
                    let record = RoleRecord {
                        role,
                        permissions: Permissions::from_set(table.grants(role)),
                    };
                    (role.as_str(), record)
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &records)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Answer a single lookup. Names accept both the kebab-case capability
/// names and the legacy `canXxx` keys.
pub fn check<W: Write>(role: &str, capability: &str, out: &mut W) -> Result<bool> {
    let granted = PermissionTable::global().capability_for_names(role, capability)?;
    writeln!(
        out,
        "{role} {} {capability}",
        if granted { "has" } else { "lacks" }
    )?;
    Ok(granted)
}

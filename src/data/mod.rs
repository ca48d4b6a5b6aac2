/// Data layer: table model, loading, filtering, lookup and output.
///
/// Architecture:
/// ```text
///  comparison dir/*.csv          orthogroups .csv
///        │                              │
///        ▼                              ▼
///   ┌──────────┐                 ┌─────────────┐
///   │  loader   │  parse → Table  │ orthogroups │  normalise headers,
///   └──────────┘                 └─────────────┘  first-match lookup
///        │                              │
///        ▼                              │
///   ┌──────────┐                        │
///   │  filter   │  padj < 0.05          │
///   └──────────┘                        │
///        │◄─────────────────────────────┘
///        ▼
///   ┌──────────┐
///   │  writer   │  one sheet per file → .xlsx
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod orthogroups;
pub mod writer;

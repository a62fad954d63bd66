use rollcrawl_core::models::CrawlOutput;

/// A crawl result for `name` with one minimal tab-separated row per ID.
pub fn output(id: u64, name: &str, ids: &[u64]) -> CrawlOutput {
    let dsv: String = ids
        .iter()
        .map(|id| format!("{id}\t1d20\t10\t0\t10\t{name}\thttp://cydel.net/t/{id}\troll {id}\tnoon\n"))
        .collect();
    CrawlOutput {
        id,
        character: name.to_string(),
        display_name: name.to_string(),
        dsv,
        rows: ids.len(),
    }
}

pub const HEADER: &str = "ID\tBD\tCD\tLD\tMD\t\"Character\"\t\"URL\"\t\"Purpose\"\tTime\n";

use crate::bundle::{BundleItem, Provenance};
use crate::error::Result;
use std::collections::HashMap;
use upgrade_extractor::Change;
use upgrade_vector_store::{Document, DocumentTemplates, SearchHit};

/// Union of structural changes and semantic hits.
///
/// Every structural change yields exactly one item, in the order given
/// (version, then category priority), whatever its semantic rank. Semantic
/// hits that are the same document as a structural item upgrade it to
/// [`Provenance::Both`]; the rest follow by descending score. Duplicates
/// collapse on document id, which encodes version plus change hash for atomic
/// documents and version plus sequence for full-content chunks.
pub fn merge(
    tool: &str,
    structural: &[Change],
    semantic: Vec<SearchHit>,
    templates: &DocumentTemplates,
) -> Result<Vec<BundleItem>> {
    let mut items: Vec<BundleItem> = Vec::with_capacity(structural.len() + semantic.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for change in structural {
        let id = Document::atomic_id(tool, change);
        if positions.contains_key(&id) {
            continue;
        }
        let text = templates.render_atomic(tool, change)?;
        positions.insert(id, items.len());
        items.push(BundleItem {
            document: Document::atomic(tool, change, text),
            provenance: Provenance::Structural,
            score: None,
        });
    }

    let mut semantic_only: Vec<BundleItem> = Vec::new();
    let mut semantic_seen: HashMap<String, usize> = HashMap::new();
    for hit in semantic {
        if let Some(&pos) = positions.get(&hit.document.id) {
            let item = &mut items[pos];
            item.provenance = Provenance::Both;
            item.score = Some(item.score.map_or(hit.score, |s| s.max(hit.score)));
            continue;
        }
        match semantic_seen.get(&hit.document.id) {
            Some(&pos) => {
                let item = &mut semantic_only[pos];
                if item.score.map_or(true, |s| hit.score > s) {
                    item.score = Some(hit.score);
                }
            }
            None => {
                semantic_seen.insert(hit.document.id.clone(), semantic_only.len());
                semantic_only.push(BundleItem {
                    document: hit.document,
                    provenance: Provenance::Semantic,
                    score: Some(hit.score),
                });
            }
        }
    }

    semantic_only.sort_by(|a, b| {
        let (sa, sb) = (a.score.unwrap_or(0.0), b.score.unwrap_or(0.0));
        sb.total_cmp(&sa)
            .then_with(|| a.document.id.cmp(&b.document.id))
    });
    items.extend(semantic_only);
    Ok(items)
}

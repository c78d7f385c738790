//! Image insertion

use crate::handlers::collapse_to_end;
use crate::{EditorCommand, InsertImage, Result, Transaction};
use doc_model::nodes::{create_image, ImageProps};

/// Insert an image decorator at the caret. A blank source is ignored.
pub fn insert_image(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::InsertImage(InsertImage {
        source,
        alt_text,
        max_width,
    }) = command
    else {
        return Ok(false);
    };
    let source = source.trim();
    if source.is_empty() {
        tracing::debug!("ignoring image without a source");
        return Ok(false);
    }

    let width = max_width.unwrap_or(tx.config().image.default_max_width);
    let props = ImageProps::new(source, alt_text.as_str()).with_max_width(width);
    collapse_to_end(tx);
    tx.insert_inline(create_image(&props))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorConfig;
    use doc_model::{DocumentTree, NodeRegistry, NodeType, Selection};

    fn run(config: &EditorConfig, payload: InsertImage) -> Option<DocumentTree> {
        let registry = NodeRegistry::with_defaults();
        let tree = DocumentTree::with_empty_paragraph();
        let para = tree.children(tree.root_id())[0];
        let mut tx = Transaction::new(tree, Selection::at_start_of(para), &registry, config);
        let handled = insert_image(&EditorCommand::InsertImage(payload), &mut tx).unwrap();
        handled.then(|| tx.commit().unwrap().0)
    }

    #[test]
    fn test_image_lands_inside_the_empty_paragraph() {
        let config = EditorConfig::default();
        let tree = run(
            &config,
            InsertImage {
                source: "https://example.org/fig.png".into(),
                alt_text: "Figure 1".into(),
                max_width: None,
            },
        )
        .unwrap();
        let root = tree.root_id();
        assert_eq!(tree.children(root).len(), 1);
        let para = tree.children(root)[0];
        let image = tree.node(tree.children(para)[0]).unwrap();
        assert_eq!(image.node_type(), &NodeType::IMAGE);
        let props = ImageProps::from_node(image).unwrap();
        assert_eq!(props.alt_text, "Figure 1");
        assert_eq!(props.max_width, 500);
    }

    #[test]
    fn test_default_width_from_config() {
        let mut config = EditorConfig::default();
        config.image.default_max_width = 320;
        let tree = run(
            &config,
            InsertImage {
                source: "a.png".into(),
                alt_text: String::new(),
                max_width: None,
            },
        )
        .unwrap();
        let image = tree.iter().find(|n| n.node_type() == &NodeType::IMAGE).unwrap();
        assert_eq!(ImageProps::from_node(image).unwrap().max_width, 320);
    }

    #[test]
    fn test_blank_source_is_ignored() {
        let config = EditorConfig::default();
        let payload = InsertImage {
            source: "   ".into(),
            alt_text: String::new(),
            max_width: Some(100),
        };
        assert!(run(&config, payload).is_none());
    }
}

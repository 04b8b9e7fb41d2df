//! Output Tree Parser Integration Tests
//!
//! Tests file counting and size totals over realistic workflow output
//! documents, and the path handoff into provenance output lists.

use lando_util::{flatten, ArtifactNode, OutputTree, ParseError, RemoteTreeNode};
use tempfile::TempDir;

const ALIGN_LOG: &str = r#"{
    "align_log": [
        {
            "class": "File",
            "checksum": "sha1$abc",
            "location": "/tmp/a.txt",
            "size": 900,
            "secondaryFiles": [
                {"class": "File", "checksum": "sha1$def", "location": "/tmp/a.idx", "size": 123}
            ]
        }
    ]
}"#;

const BAM_DIRECTORY: &str = r#"{
    "bams": {
        "class": "Directory",
        "location": "file:///work/output/bams",
        "listing": [
            {
                "class": "File",
                "location": "file:///work/output/bams/sample1.bam",
                "checksum": "sha1$111",
                "size": 5570967966,
                "secondaryFiles": [
                    {"class": "File", "location": "file:///work/output/bams/sample1.bai", "size": 6218232}
                ]
            },
            {
                "class": "File",
                "location": "file:///work/output/bams/sample2.bam",
                "checksum": "sha1$222",
                "size": 7253903222,
                "secondaryFiles": [
                    {"class": "File", "location": "file:///work/output/bams/sample2.bai", "size": 6309968}
                ]
            }
        ]
    }
}"#;

#[test]
fn test_file_with_secondary_file() {
    let tree = OutputTree::parse(ALIGN_LOG).unwrap();
    assert_eq!(tree.file_count(), 2);
    assert_eq!(tree.total_size(), 1023);
}

#[test]
fn test_directory_listing_with_secondary_files() {
    let tree = OutputTree::parse(BAM_DIRECTORY).unwrap();
    assert_eq!(tree.file_count(), 4);
    assert_eq!(
        tree.total_size(),
        5570967966 + 6218232 + 7253903222 + 6309968
    );
    assert_eq!(
        tree.file_paths(),
        vec![
            "/work/output/bams/sample1.bam",
            "/work/output/bams/sample1.bai",
            "/work/output/bams/sample2.bam",
            "/work/output/bams/sample2.bai",
        ]
    );
}

#[test]
fn test_mixed_ports_and_nested_directories() {
    let tree = OutputTree::parse(
        r#"{
            "qc_reports": [
                {"class": "Directory", "location": "/out/qc", "listing": [
                    {"class": "Directory", "location": "/out/qc/sample1", "listing": [
                        {"class": "File", "location": "/out/qc/sample1/report.html", "size": 10}
                    ]},
                    {"class": "Directory", "location": "/out/qc/empty"}
                ]}
            ],
            "vcf": {"class": "File", "location": "/out/calls.vcf.gz", "size": 20,
                    "secondaryFiles": [
                        {"class": "File", "location": "/out/calls.vcf.gz.tbi", "size": 1,
                         "secondaryFiles": [{"class": "File", "location": "/out/calls.vcf.gz.tbi.md5"}]}
                    ]},
            "skipped": null
        }"#,
    )
    .unwrap();

    assert_eq!(tree.ports().len(), 3);
    assert_eq!(tree.file_count(), 4);
    assert_eq!(tree.total_size(), 31);

    // Directories are walked but never counted
    let dirs = tree.walk().filter(|n| !n.is_file()).count();
    assert_eq!(dirs, 3);
}

#[test]
fn test_malformed_output_aborts() {
    let err = OutputTree::parse(
        r#"{"good": {"class": "File", "location": "/a", "size": 1},
            "bad": {"class": "File", "location": "/b", "secondaryFiles": [{"class": "Link", "location": "/c"}]}}"#,
    )
    .unwrap_err();

    match err {
        ParseError::MalformedNode { at, .. } => assert_eq!(at, "bad"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_top_level_nodes_keep_source_order() {
    let tree = OutputTree::parse(BAM_DIRECTORY).unwrap();
    let roots: Vec<&ArtifactNode> = tree.roots().collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].path(), "/work/output/bams");
}

#[tokio::test]
async fn test_from_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bespin-workflow-output.json");
    tokio::fs::write(&path, ALIGN_LOG).await.unwrap();

    let tree = OutputTree::from_path(&path).await.unwrap();
    assert_eq!(tree.inventory().file_count, 2);

    let missing = OutputTree::from_path(&temp.path().join("nope.json")).await;
    assert!(matches!(missing, Err(ParseError::Read { .. })));
}

#[test]
fn test_output_paths_resolve_against_uploaded_tree() {
    let tree = OutputTree::parse(BAM_DIRECTORY).unwrap();
    let uploaded = flatten(&RemoteTreeNode::project(
        "p1",
        vec![RemoteTreeNode::folder(
            "bams",
            vec![
                RemoteTreeNode::file("f1", "/work/output/bams/sample1.bam"),
                RemoteTreeNode::file("f2", "/work/output/bams/sample1.bai"),
                RemoteTreeNode::file("f3", "/work/output/bams/sample2.bam"),
                RemoteTreeNode::file("f4", "/work/output/bams/sample2.bai"),
            ],
        )],
    ));

    let ids: Vec<Option<&str>> = tree
        .file_paths()
        .iter()
        .map(|path| uploaded.get(path))
        .collect();
    assert_eq!(ids, vec![Some("f1"), Some("f2"), Some("f3"), Some("f4")]);
}

#[test]
fn test_deeply_nested_directory_listing() {
    let depth = 200;
    let mut json = String::new();
    for i in 0..depth {
        json.push_str(&format!(
            r#"{{"class": "Directory", "location": "file:///out/d{}", "listing": [{{"class": "File", "location": "/out/f{}", "size": 2}}, "#,
            i, i
        ));
    }
    json.push_str(r#"{"class": "Directory", "location": "/out/bottom"}"#);
    for _ in 0..depth {
        json.push_str("]}");
    }

    let tree = OutputTree::parse(&format!(r#"{{"tree": [{}]}}"#, json)).unwrap();
    assert_eq!(tree.file_count(), depth);
    assert_eq!(tree.total_size(), 2 * depth as u64);
}

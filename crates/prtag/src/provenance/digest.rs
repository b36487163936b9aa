//! SHA-512 content digests over git objects
//!
//! A commit's content digest binds it to everything it transitively
//! references. Every object is hashed as `<kind> <len>\0<body>`, where the
//! body is the object's canonical git encoding with each referenced object id
//! replaced by that object's SHA-512:
//!
//! - blobs: the raw content
//! - trees: each 20-byte entry id becomes the 64-byte raw digest
//! - commits: `tree` and `parent` headers carry hex digests
//! - annotated tags: the `object` header carries a hex digest
//!
//! Submodule entries (mode `160000`) keep their original id; the commit they
//! name lives in another repository.

use crate::error::{PrtagError, Result};
use git2::{ObjectType, Odb, Oid};
use sha2::{Digest, Sha512};
use std::collections::HashMap;

/// Length in bytes of every content digest.
pub const DIGEST_LEN: usize = 64;

/// Raw object id length of a SHA-1 repository.
const RAW_OID_LEN: usize = 20;

const GITLINK_MODE: &[u8] = b"160000";

const COMMIT_REFS: &[&[u8]] = &[b"tree ", b"parent "];
const TAG_REFS: &[&[u8]] = &[b"object "];

type Sum = [u8; DIGEST_LEN];

/// Compute the SHA-512 hex digest of a byte slice.
#[must_use]
pub fn bytes_digest(data: &[u8]) -> String {
    hex_encode(&Sha512::digest(data))
}

/// Encode bytes as a lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

/// Memoising SHA-512 hasher over one repository's object database.
///
/// Digests of shared subtrees and ancestors are computed once per hasher.
pub struct ObjectHasher<'r> {
    odb: Odb<'r>,
    memo: HashMap<Oid, Sum>,
}

impl<'r> ObjectHasher<'r> {
    /// # Errors
    ///
    /// Returns `PrtagError::Digest` if the object database cannot be opened.
    pub fn new(repo: &'r git2::Repository) -> Result<Self> {
        let odb = repo
            .odb()
            .map_err(|e| PrtagError::Digest(format!("unable to open object database: {e}")))?;
        Ok(Self {
            odb,
            memo: HashMap::new(),
        })
    }

    /// Digest of a commit and its full history.
    ///
    /// # Errors
    ///
    /// Returns `PrtagError::Digest` if `oid` is not a commit, or if any
    /// reachable object is missing or malformed.
    pub fn commit_sum(&mut self, oid: Oid) -> Result<Vec<u8>> {
        let kind = self
            .odb
            .read_header(oid)
            .map_err(|e| PrtagError::Digest(format!("unable to read object {oid}: {e}")))?
            .1;
        if kind != ObjectType::Commit {
            return Err(PrtagError::Digest(format!(
                "object {oid} is a {}, not a commit",
                kind.str()
            )));
        }
        Ok(self.object_sum(oid)?.to_vec())
    }

    /// Digest of any object and everything it references.
    ///
    /// Traversal is iterative: an object is hashed once all of its
    /// references have been.
    ///
    /// # Errors
    ///
    /// Returns `PrtagError::Digest` if a reachable object is missing or
    /// malformed.
    pub fn object_sum(&mut self, root: Oid) -> Result<Sum> {
        let mut stack = vec![root];

        while let Some(oid) = stack.pop() {
            if self.memo.contains_key(&oid) {
                continue;
            }

            let object = self
                .odb
                .read(oid)
                .map_err(|e| PrtagError::Digest(format!("unable to read object {oid}: {e}")))?;
            let kind = object.kind();
            let data = object.data();

            let pending: Vec<Oid> = references(kind, data, oid)?
                .into_iter()
                .filter(|r| !self.memo.contains_key(r))
                .collect();

            if pending.is_empty() {
                let sum = hash_object(kind, data, oid, &self.memo)?;
                self.memo.insert(oid, sum);
            } else {
                stack.push(oid);
                stack.extend(pending);
            }
        }

        self.memo
            .get(&root)
            .copied()
            .ok_or_else(|| PrtagError::Digest(format!("digest of {root} was not computed")))
    }
}

/// Object ids that `data` refers to and that must be hashed first.
fn references(kind: ObjectType, data: &[u8], oid: Oid) -> Result<Vec<Oid>> {
    match kind {
        ObjectType::Blob => Ok(Vec::new()),
        ObjectType::Tree => {
            let mut refs = Vec::new();
            for entry in TreeEntries::new(data, oid) {
                let entry = entry?;
                if entry.mode != GITLINK_MODE {
                    refs.push(oid_from_raw(entry.id, oid)?);
                }
            }
            Ok(refs)
        }
        ObjectType::Commit => header_ids(data, COMMIT_REFS, oid),
        ObjectType::Tag => header_ids(data, TAG_REFS, oid),
        ObjectType::Any => Err(PrtagError::Digest(format!(
            "object {oid} has an unknown type"
        ))),
    }
}

fn hash_object(kind: ObjectType, data: &[u8], oid: Oid, memo: &HashMap<Oid, Sum>) -> Result<Sum> {
    let body = match kind {
        ObjectType::Blob => data.to_vec(),
        ObjectType::Tree => rewrite_tree(data, oid, memo)?,
        ObjectType::Commit => rewrite_headers(data, COMMIT_REFS, oid, memo)?,
        ObjectType::Tag => rewrite_headers(data, TAG_REFS, oid, memo)?,
        ObjectType::Any => {
            return Err(PrtagError::Digest(format!(
                "object {oid} has an unknown type"
            )))
        }
    };

    let mut hasher = Sha512::new();
    hasher.update(format!("{} {}\0", kind.str(), body.len()).as_bytes());
    hasher.update(&body);
    let mut sum = [0u8; DIGEST_LEN];
    sum.copy_from_slice(&hasher.finalize());
    Ok(sum)
}

fn lookup<'m>(memo: &'m HashMap<Oid, Sum>, id: Oid, parent: Oid) -> Result<&'m Sum> {
    memo.get(&id).ok_or_else(|| {
        PrtagError::Digest(format!("object {id} referenced by {parent} was not hashed"))
    })
}

fn rewrite_tree(data: &[u8], oid: Oid, memo: &HashMap<Oid, Sum>) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(data.len() * 2);
    for entry in TreeEntries::new(data, oid) {
        let entry = entry?;
        body.extend_from_slice(entry.mode);
        body.push(b' ');
        body.extend_from_slice(entry.name);
        body.push(0);
        if entry.mode == GITLINK_MODE {
            body.extend_from_slice(entry.id);
        } else {
            let child = oid_from_raw(entry.id, oid)?;
            body.extend_from_slice(lookup(memo, child, oid)?);
        }
    }
    Ok(body)
}

/// Split a commit or tag into its header block and the remainder, which
/// starts at the blank line separating headers from the message.
fn split_headers(data: &[u8]) -> (&[u8], &[u8]) {
    match data.windows(2).position(|w| w == b"\n\n") {
        Some(pos) => (&data[..pos], &data[pos..]),
        None => (data, &data[data.len()..]),
    }
}

fn header_ids(data: &[u8], keys: &[&[u8]], oid: Oid) -> Result<Vec<Oid>> {
    let (headers, _) = split_headers(data);
    let mut ids = Vec::new();
    for line in headers.split(|&b| b == b'\n') {
        if let Some(hex) = keys.iter().find_map(|k| line.strip_prefix(*k)) {
            ids.push(oid_from_hex(hex, oid)?);
        }
    }
    Ok(ids)
}

fn rewrite_headers(
    data: &[u8],
    keys: &[&[u8]],
    oid: Oid,
    memo: &HashMap<Oid, Sum>,
) -> Result<Vec<u8>> {
    let (headers, rest) = split_headers(data);
    let mut body = Vec::with_capacity(data.len() + 512);

    for (i, line) in headers.split(|&b| b == b'\n').enumerate() {
        if i > 0 {
            body.push(b'\n');
        }
        match keys.iter().find(|k| line.starts_with(k)) {
            Some(key) => {
                let id = oid_from_hex(&line[key.len()..], oid)?;
                body.extend_from_slice(key);
                body.extend_from_slice(hex_encode(lookup(memo, id, oid)?).as_bytes());
            }
            None => body.extend_from_slice(line),
        }
    }

    body.extend_from_slice(rest);
    Ok(body)
}

fn oid_from_hex(hex: &[u8], parent: Oid) -> Result<Oid> {
    std::str::from_utf8(hex)
        .ok()
        .and_then(|s| Oid::from_str(s.trim()).ok())
        .ok_or_else(|| PrtagError::Digest(format!("object {parent} has a malformed object id")))
}

fn oid_from_raw(raw: &[u8], parent: Oid) -> Result<Oid> {
    Oid::from_bytes(raw)
        .map_err(|e| PrtagError::Digest(format!("tree {parent} has a malformed entry id: {e}")))
}

struct TreeEntry<'a> {
    mode: &'a [u8],
    name: &'a [u8],
    id: &'a [u8],
}

/// Iterator over the raw entries of a tree object.
struct TreeEntries<'a> {
    data: &'a [u8],
    oid: Oid,
    failed: bool,
}

impl<'a> TreeEntries<'a> {
    fn new(data: &'a [u8], oid: Oid) -> Self {
        Self {
            data,
            oid,
            failed: false,
        }
    }

    fn malformed(&mut self) -> Option<Result<TreeEntry<'a>>> {
        self.failed = true;
        Some(Err(PrtagError::Digest(format!(
            "tree {} is malformed",
            self.oid
        ))))
    }
}

impl<'a> Iterator for TreeEntries<'a> {
    type Item = Result<TreeEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.data.is_empty() {
            return None;
        }
        let data = self.data;

        let Some(space) = data.iter().position(|&b| b == b' ') else {
            return self.malformed();
        };
        let Some(nul) = data[space..].iter().position(|&b| b == 0).map(|p| p + space) else {
            return self.malformed();
        };
        let id_end = nul + 1 + RAW_OID_LEN;
        if id_end > data.len() {
            return self.malformed();
        }

        self.data = &data[id_end..];
        Some(Ok(TreeEntry {
            mode: &data[..space],
            name: &data[space + 1..nul],
            id: &data[nul + 1..id_end],
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use git2::{Repository, Signature, Time};

    const HELLO_BLOB_SHA512: &str = "fc61d158a3e4caee1fc0078d530f374f6fdc8f46c0080cd71c1eece6264f65f15c9ef82d3c5a5c416d84e29e5be70fa600b775b0a84214519f7afafc30e5b07f";

    fn sig() -> Signature<'static> {
        Signature::new("Test", "test@example.com", &Time::new(1_700_000_000, 0)).unwrap()
    }

    fn commit_file(repo: &Repository, name: &str, content: &[u8], parents: &[Oid]) -> Oid {
        let blob = repo.blob(content).unwrap();
        let mut builder = repo.treebuilder(None).unwrap();
        builder.insert(name, blob, 0o100644).unwrap();
        let tree = repo.find_tree(builder.write().unwrap()).unwrap();
        let parents: Vec<git2::Commit<'_>> =
            parents.iter().map(|p| repo.find_commit(*p).unwrap()).collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        repo.commit(None, &sig(), &sig(), "message\n", &tree, &parent_refs)
            .unwrap()
    }

    fn sha512(parts: &[&[u8]]) -> Sum {
        let mut h = Sha512::new();
        for p in parts {
            h.update(p);
        }
        let mut sum = [0u8; DIGEST_LEN];
        sum.copy_from_slice(&h.finalize());
        sum
    }

    #[test]
    fn bytes_digest_empty() {
        assert_eq!(
            bytes_digest(b""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn bytes_digest_length() {
        assert_eq!(bytes_digest(b"any input").len(), DIGEST_LEN * 2);
    }

    #[test]
    fn hex_encode_correctness() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0xab, 0x01]), "00ffab01");
    }

    #[test]
    fn blob_sum_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let blob = repo.blob(b"hello").unwrap();
        let mut hasher = ObjectHasher::new(&repo).unwrap();
        assert_eq!(hex_encode(&hasher.object_sum(blob).unwrap()), HELLO_BLOB_SHA512);
    }

    #[test]
    fn commit_sum_matches_manual_construction() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let commit = commit_file(&repo, "hello.txt", b"hello", &[]);

        let mut hasher = ObjectHasher::new(&repo).unwrap();
        let sum = hasher.commit_sum(commit).unwrap();

        let blob_sum = sha512(&[b"blob 5\0hello"]);
        let mut tree_body = b"100644 hello.txt\0".to_vec();
        tree_body.extend_from_slice(&blob_sum);
        let tree_sum = sha512(&[
            format!("tree {}\0", tree_body.len()).as_bytes(),
            &tree_body,
        ]);

        let raw = repo.odb().unwrap().read(commit).unwrap().data().to_vec();
        let raw = String::from_utf8(raw).unwrap();
        let tree_id = repo.find_commit(commit).unwrap().tree_id();
        let rewritten = raw.replacen(
            &format!("tree {tree_id}"),
            &format!("tree {}", hex_encode(&tree_sum)),
            1,
        );
        let expected = sha512(&[
            format!("commit {}\0", rewritten.len()).as_bytes(),
            rewritten.as_bytes(),
        ]);

        assert_eq!(sum, expected.to_vec());
    }

    #[test]
    fn commit_sum_is_deterministic_and_fixed_length() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let commit = commit_file(&repo, "a.txt", b"a", &[]);

        let first = ObjectHasher::new(&repo).unwrap().commit_sum(commit).unwrap();
        let second = ObjectHasher::new(&repo).unwrap().commit_sum(commit).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), DIGEST_LEN);
        assert_eq!(hex_encode(&first).len(), DIGEST_LEN * 2);
    }

    #[test]
    fn history_changes_the_digest() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let base_a = commit_file(&repo, "a.txt", b"one", &[]);
        let base_b = commit_file(&repo, "a.txt", b"two", &[]);
        let tip_a = commit_file(&repo, "b.txt", b"same", &[base_a]);
        let tip_b = commit_file(&repo, "b.txt", b"same", &[base_b]);

        // Identical trees, different ancestry
        assert_eq!(
            repo.find_commit(tip_a).unwrap().tree_id(),
            repo.find_commit(tip_b).unwrap().tree_id()
        );
        let mut hasher = ObjectHasher::new(&repo).unwrap();
        assert_ne!(
            hasher.commit_sum(tip_a).unwrap(),
            hasher.commit_sum(tip_b).unwrap()
        );
    }

    #[test]
    fn long_history_does_not_recurse() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut tip = commit_file(&repo, "n.txt", b"0", &[]);
        for i in 1..300 {
            tip = commit_file(&repo, "n.txt", i.to_string().as_bytes(), &[tip]);
        }
        let sum = ObjectHasher::new(&repo).unwrap().commit_sum(tip).unwrap();
        assert_eq!(sum.len(), DIGEST_LEN);
    }

    #[test]
    fn gitlink_keeps_original_id() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let sub = commit_file(&repo, "inner.txt", b"inner", &[]);

        let mut builder = repo.treebuilder(None).unwrap();
        builder.insert("vendor", sub, 0o160000).unwrap();
        let tree = builder.write().unwrap();

        let mut body = b"160000 vendor\0".to_vec();
        body.extend_from_slice(sub.as_bytes());
        let expected = sha512(&[format!("tree {}\0", body.len()).as_bytes(), &body]);

        let mut hasher = ObjectHasher::new(&repo).unwrap();
        assert_eq!(hasher.object_sum(tree).unwrap(), expected);
    }

    #[test]
    fn commit_sum_rejects_non_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let blob = repo.blob(b"hello").unwrap();
        let err = ObjectHasher::new(&repo).unwrap().commit_sum(blob).unwrap_err();
        assert!(matches!(err, PrtagError::Digest(_)));
    }

    #[test]
    fn missing_object_is_digest_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let missing = Oid::from_str("1111111111111111111111111111111111111111").unwrap();
        let err = ObjectHasher::new(&repo).unwrap().object_sum(missing).unwrap_err();
        assert!(matches!(err, PrtagError::Digest(_)));
    }

    #[test]
    fn malformed_tree_is_rejected() {
        let oid = Oid::zero();
        let entries: Vec<_> = TreeEntries::new(b"100644 truncated\0abc", oid).collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_err());
    }
}

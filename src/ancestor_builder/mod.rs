//! Ancestor Builder.
//!
//! Groups sites by allele frequency and derives one ancestral haplotype per
//! equivalence class of "focal sites" sharing an identical genotype
//! pattern. Independent of [`crate::tree_sequence`] and
//! [`crate::ancestor_matcher`].

use std::collections::BTreeMap;

use crate::error::{TsinferError, TsinferResult};
use crate::ids::{Allele, SiteId, MISSING_ALLELE};

/// Minimum size a consensus set must retain for an *outward* extension step
/// to still count as informative.
///
/// A consensus of a single sample carries no shared-ancestry signal, so
/// outward walks stop once the consensus set would drop below this size.
/// The *interior* span between a group's bounding focal sites is always
/// fully derived regardless of this threshold, since every focal site must
/// lie in `[start, end)` by construction.
const MIN_INFORMATIVE_CONSENSUS: usize = 2;

#[derive(Debug, Clone)]
struct SiteRecord {
    frequency: usize,
    genotypes: Vec<Allele>,
}

/// Groups sites by `(frequency, genotype pattern)`, realized as a nested
/// ordered map so that iteration order is deterministic (full genotype
/// columns, not a hash, are the map key) rather than hash-iteration order.
type FrequencyMap = BTreeMap<usize, BTreeMap<Vec<Allele>, Vec<SiteId>>>;

/// Builds ancestral haplotypes from per-site genotype columns.
///
/// Construction is pure in `make_ancestor`'s inputs: repeated calls with
/// the same `focal_sites` yield byte-identical output, since no internal
/// mutable state is touched by that method.
#[derive(Debug)]
pub struct AncestorBuilder {
    num_samples: usize,
    num_sites: usize,
    sites: Vec<Option<SiteRecord>>,
    frequency_map: FrequencyMap,
}

impl AncestorBuilder {
    pub fn new(num_samples: usize, num_sites: usize) -> Self {
        Self {
            num_samples,
            num_sites,
            sites: vec![None; num_sites],
            frequency_map: BTreeMap::new(),
        }
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    /// Total number of distinct `(frequency, pattern)` groups recorded so
    /// far, i.e. the number of ancestors a driver could derive from this
    /// builder.
    pub fn num_ancestors(&self) -> usize {
        self.frequency_map.values().map(|m| m.len()).sum()
    }

    /// The distinct frequencies recorded so far, ascending.
    pub fn frequency_classes(&self) -> impl Iterator<Item = usize> + '_ {
        self.frequency_map.keys().copied()
    }

    /// The site-id groups recorded at a given frequency, in genotype-pattern
    /// order. Each group's sites share an identical genotype column.
    pub fn groups_at_frequency(&self, frequency: usize) -> impl Iterator<Item = &[SiteId]> {
        self.frequency_map
            .get(&frequency)
            .into_iter()
            .flat_map(|m| m.values())
            .map(|v| v.as_slice())
    }

    /// Record site `site`'s full genotype column.
    ///
    /// `frequency` must equal the number of `1` alleles in `genotypes`
    /// (the caller already knows it and it is trusted rather than
    /// recomputed on every call); `genotypes.len()` must equal
    /// `num_samples`.
    pub fn add_site(
        &mut self,
        site: SiteId,
        frequency: usize,
        genotypes: &[Allele],
    ) -> TsinferResult<()> {
        let idx = site.as_usize();
        if idx >= self.num_sites {
            return Err(TsinferError::argument(format!(
                "site {site} out of range (num_sites = {})",
                self.num_sites
            )));
        }
        if genotypes.len() != self.num_samples {
            return Err(TsinferError::argument(format!(
                "genotypes length {} does not match num_samples {}",
                genotypes.len(),
                self.num_samples
            )));
        }
        log::trace!("add_site: site={site} frequency={frequency}");
        self.frequency_map
            .entry(frequency)
            .or_default()
            .entry(genotypes.to_vec())
            .or_default()
            .push(site);
        self.sites[idx] = Some(SiteRecord {
            frequency,
            genotypes: genotypes.to_vec(),
        });
        Ok(())
    }

    fn site_record(&self, site: SiteId) -> TsinferResult<&SiteRecord> {
        let idx = site.as_usize();
        self.sites
            .get(idx)
            .and_then(|s| s.as_ref())
            .ok_or_else(|| TsinferError::argument(format!("site {site} was never added")))
    }

    /// Derive the ancestral haplotype explained by `focal_sites`.
    ///
    /// All of `focal_sites` must share the same frequency and the same
    /// genotype pattern (i.e. belong to the same `frequency_map` group);
    /// anything else is a fatal programmer error.
    ///
    /// Returns `(start, end, haplotype)` where `haplotype` has length
    /// `num_sites`, `haplotype[s]` is `-1` for `s` outside `[start, end)`,
    /// and focal sites within the interval are set to `1`.
    pub fn make_ancestor(
        &self,
        focal_sites: &[SiteId],
    ) -> TsinferResult<(SiteId, SiteId, Vec<Allele>)> {
        if focal_sites.is_empty() {
            return Err(TsinferError::argument("focal_sites must be non-empty"));
        }
        let mut sorted_focal: Vec<SiteId> = focal_sites.to_vec();
        sorted_focal.sort_by_key(|s| s.0);

        let first = self.site_record(sorted_focal[0])?;
        let frequency = first.frequency;
        let pattern = &first.genotypes;
        for &s in &sorted_focal[1..] {
            let rec = self.site_record(s)?;
            if rec.frequency != frequency || &rec.genotypes != pattern {
                return Err(TsinferError::argument(
                    "focal_sites span multiple (frequency, pattern) groups",
                ));
            }
        }

        let consensus: Vec<usize> = pattern
            .iter()
            .enumerate()
            .filter(|(_, &a)| a == 1)
            .map(|(i, _)| i)
            .collect();

        let mut haplotype = vec![MISSING_ALLELE; self.num_sites];
        for &s in &sorted_focal {
            haplotype[s.as_usize()] = 1;
        }

        let leftmost = sorted_focal[0].as_usize();
        let rightmost = sorted_focal[sorted_focal.len() - 1].as_usize();

        // Interior span: always fully derived, consensus may shrink but
        // never below 1 (majority-narrowing a non-empty set always leaves
        // at least the majority side, which is non-empty).
        let mut interior_consensus = consensus.clone();
        for site in (leftmost + 1)..rightmost {
            let allele = self.vote_and_shrink(site, frequency, &mut interior_consensus);
            haplotype[site] = allele;
        }

        // Outward extension, left and right, each starting independently
        // from the full consensus set.
        let start = self.extend_outward(leftmost, frequency, &consensus, Direction::Left);
        let end = self.extend_outward(rightmost, frequency, &consensus, Direction::Right);

        // extend_outward only determines the boundary; re-walk the same
        // (site, consensus) sequence to record the alleles it computed
        // along the way.
        self.fill_outward(start, leftmost, frequency, &consensus, &mut haplotype);
        self.fill_outward_right(rightmost, end, frequency, &consensus, &mut haplotype);

        log::trace!(
            "make_ancestor: focal={:?} -> [{start}, {end})",
            sorted_focal
        );

        Ok((SiteId::from(start), SiteId::from(end), haplotype))
    }

    /// Compute the majority allele within `consensus` at `site`, and, if
    /// `site`'s frequency is `>= focal_frequency`, shrink `consensus` to
    /// the subset agreeing with that majority. Ties break toward `0`.
    fn vote_and_shrink(
        &self,
        site: usize,
        focal_frequency: usize,
        consensus: &mut Vec<usize>,
    ) -> Allele {
        let record = self.sites[site]
            .as_ref()
            .expect("interior/extension sites must have been added");
        let mut ones = Vec::new();
        let mut zeros = Vec::new();
        for &sample in consensus.iter() {
            match record.genotypes[sample] {
                1 => ones.push(sample),
                0 => zeros.push(sample),
                _ => {} // missing: uninformative, neither narrows nor votes
            }
        }
        let majority: Allele = if ones.len() > zeros.len() { 1 } else { 0 };
        if record.frequency >= focal_frequency {
            *consensus = if majority == 1 { ones } else { zeros };
        }
        majority
    }

    /// Walk outward from `boundary` (exclusive) in `direction`, shrinking a
    /// scratch copy of `consensus`, and return the first site index *not*
    /// included in the final interval (i.e. `start` for `Direction::Left`,
    /// `end` for `Direction::Right`).
    fn extend_outward(
        &self,
        boundary: usize,
        focal_frequency: usize,
        consensus: &[usize],
        direction: Direction,
    ) -> usize {
        let mut scratch = consensus.to_vec();
        match direction {
            Direction::Left => {
                let mut site = boundary;
                loop {
                    if site == 0 {
                        return 0;
                    }
                    if scratch.len() < MIN_INFORMATIVE_CONSENSUS || self.sites[site - 1].is_none()
                    {
                        return site;
                    }
                    self.vote_and_shrink(site - 1, focal_frequency, &mut scratch);
                    site -= 1;
                }
            }
            Direction::Right => {
                let mut site = boundary;
                loop {
                    if site + 1 >= self.num_sites {
                        return self.num_sites;
                    }
                    if scratch.len() < MIN_INFORMATIVE_CONSENSUS || self.sites[site + 1].is_none()
                    {
                        return site + 1;
                    }
                    self.vote_and_shrink(site + 1, focal_frequency, &mut scratch);
                    site += 1;
                }
            }
        }
    }

    fn fill_outward(
        &self,
        start: usize,
        leftmost: usize,
        focal_frequency: usize,
        consensus: &[usize],
        haplotype: &mut [Allele],
    ) {
        if start >= leftmost {
            return;
        }
        let mut scratch = consensus.to_vec();
        let mut alleles = vec![0 as Allele; leftmost - start];
        for (offset, site) in (start..leftmost).rev().enumerate() {
            alleles[leftmost - start - 1 - offset] =
                self.vote_and_shrink(site, focal_frequency, &mut scratch);
        }
        for (i, site) in (start..leftmost).enumerate() {
            haplotype[site] = alleles[i];
        }
    }

    fn fill_outward_right(
        &self,
        rightmost: usize,
        end: usize,
        focal_frequency: usize,
        consensus: &[usize],
        haplotype: &mut [Allele],
    ) {
        if rightmost + 1 >= end {
            return;
        }
        let mut scratch = consensus.to_vec();
        for site in (rightmost + 1)..end {
            haplotype[site] = self.vote_and_shrink(site, focal_frequency, &mut scratch);
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Left,
    Right,
}

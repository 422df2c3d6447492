//! Built-in demo gene catalog.
//!
//! Positions are synthetic coordinates on a shared axis, not real genomic
//! loci; the chromosome is carried as metadata only.

use crate::interval::{keys, GeneRecord};
use crate::tree::IntervalTree;

/// (start, end, name, chromosome, type, function, disease)
type CatalogEntry = (i64, i64, &'static str, &'static str, &'static str, &'static str, &'static str);

const DEMO_GENES: &[CatalogEntry] = &[
    // Protein coding, cancer related
    (100, 300, "BRCA1", "Chr17", "Protein Coding", "DNA repair", "Breast cancer"),
    (250, 420, "TP53", "Chr17", "Protein Coding", "Tumor suppressor", "Multiple cancers"),
    (500, 680, "MYC", "Chr8", "Protein Coding", "Cell cycle regulation", "Leukemia"),
    (700, 920, "EGFR", "Chr7", "Protein Coding", "Cell signaling", "Lung cancer"),
    (850, 1020, "KRAS", "Chr12", "Protein Coding", "Signal transduction", "Pancreatic cancer"),
    (1050, 1220, "PTEN", "Chr10", "Protein Coding", "Tumor suppression", "Glioblastoma"),
    (1250, 1430, "ALK", "Chr2", "Protein Coding", "Kinase signaling", "Lung cancer"),
    (1450, 1630, "BRAF", "Chr7", "Protein Coding", "MAPK pathway", "Melanoma"),
    (1650, 1820, "CDKN2A", "Chr9", "Protein Coding", "Cell cycle inhibition", "Skin cancer"),
    (1850, 2030, "RB1", "Chr13", "Protein Coding", "Cell cycle control", "Retinoblastoma"),
    (2050, 2290, "NF1", "Chr17", "Protein Coding", "Signal regulation", "Neurofibromatosis"),
    (2300, 2550, "APC", "Chr5", "Protein Coding", "Tumor suppression", "Colon cancer"),
    (2580, 2760, "SMAD4", "Chr18", "Protein Coding", "TGF-beta signaling", "Pancreatic cancer"),
    (2780, 2990, "PIK3CA", "Chr3", "Protein Coding", "Cell growth regulation", "Breast cancer"),
    (3020, 3190, "VHL", "Chr3", "Protein Coding", "Hypoxia response", "Kidney cancer"),
    // miRNA
    (3200, 3250, "MIR21", "Chr17", "miRNA", "Post-transcriptional regulation", "Cancer"),
    (3270, 3320, "MIR155", "Chr21", "miRNA", "Immune regulation", "Lymphoma"),
    (3340, 3390, "MIR34A", "Chr1", "miRNA", "Tumor suppression", "Cancer"),
    (3410, 3460, "MIR10B", "Chr2", "miRNA", "Cell migration", "Breast cancer"),
    (3480, 3530, "MIR122", "Chr18", "miRNA", "Liver metabolism", "Liver disease"),
    // lncRNA
    (3550, 3750, "LINC00152", "Chr2", "lncRNA", "Gene regulation", "Gastric cancer"),
    (3780, 3980, "HOTAIR", "Chr12", "lncRNA", "Chromatin remodeling", "Breast cancer"),
    (4000, 4200, "MALAT1", "Chr11", "lncRNA", "RNA splicing", "Metastasis"),
    (4230, 4450, "XIST", "ChrX", "lncRNA", "X-chromosome inactivation", "Epigenetic disorders"),
    (4480, 4680, "NEAT1", "Chr11", "lncRNA", "Nuclear structure", "Cancer"),
    // Regulatory elements
    (4700, 4850, "REG1", "Chr6", "Regulatory", "Transcription regulation", "Metabolic disorder"),
    (4870, 5020, "REG2", "Chr8", "Regulatory", "Enhancer activity", "None"),
    (5050, 5200, "REG3", "Chr4", "Regulatory", "Gene expression control", "Immune disorder"),
    (5220, 5370, "REG4", "Chr10", "Regulatory", "Promoter regulation", "Cancer"),
    (5400, 5550, "REG5", "Chr14", "Regulatory", "Chromatin accessibility", "None"),
    // Pseudogenes
    (5580, 5700, "PSEUD1", "Chr1", "Pseudogene", "Inactive gene copy", "None"),
    (5720, 5850, "PSEUD2", "Chr5", "Pseudogene", "Gene relic", "None"),
    (5870, 6000, "PSEUD3", "Chr9", "Pseudogene", "Nonfunctional duplication", "None"),
    // snoRNA
    (6020, 6100, "SNORD1", "Chr15", "snoRNA", "rRNA modification", "None"),
    (6120, 6200, "SNORD2", "Chr16", "snoRNA", "RNA processing", "None"),
    (6220, 6300, "SNORD3", "Chr17", "snoRNA", "Ribosome biogenesis", "None"),
];

/// Demo records in catalog order.
pub fn demo_records() -> Vec<GeneRecord> {
    DEMO_GENES
        .iter()
        .map(|&(start, end, name, chrom, gene_type, function, disease)| {
            GeneRecord::new(start, end, name)
                .with_attr(keys::CHROMOSOME, chrom)
                .with_attr(keys::TYPE, gene_type)
                .with_attr(keys::FUNCTION, function)
                .with_attr(keys::DISEASE, disease)
        })
        .collect()
}

/// A tree preloaded with the demo catalog, inserted in catalog order.
pub fn demo_tree() -> IntervalTree {
    demo_records().into_iter().collect()
}
